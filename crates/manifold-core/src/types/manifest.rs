//! Manifest and dependency bucket types.
//!
//! A [`Manifest`] is the merge-relevant view of a package file: its name,
//! the file it came from and its dependency buckets. Everything else in the
//! file stays with the loader.

use camino::Utf8PathBuf;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Dependency name to version constraint, in file order
pub type DependencyMap = IndexMap<String, String>;

/// Bucket conventionally holding forced resolutions
pub const DEFAULT_OVERRIDE_BUCKET: &str = "resolutions";

/// Merge-relevant contents of one manifest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Package name, when the file declares one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// File the manifest was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Utf8PathBuf>,

    /// Dependency buckets keyed by field name (`dependencies`, ...)
    #[serde(default)]
    pub buckets: IndexMap<String, DependencyMap>,
}

/// Bucket names taking part in a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSet {
    names: IndexSet<String>,
    override_bucket: String,
}

impl Manifest {
    /// Create an empty manifest with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Attach the originating file path
    pub fn with_source(mut self, source: impl Into<Utf8PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add or replace a whole bucket
    pub fn with_bucket<I, K, V>(mut self, bucket: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        self.buckets.insert(bucket.to_string(), map);
        self
    }

    pub fn bucket(&self, bucket: &str) -> Option<&DependencyMap> {
        self.buckets.get(bucket)
    }

    pub fn bucket_mut(&mut self, bucket: &str) -> Option<&mut DependencyMap> {
        self.buckets.get_mut(bucket)
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.contains_key(bucket)
    }

    /// Insert an empty bucket unless one already exists
    pub fn ensure_bucket(&mut self, bucket: &str) {
        if !self.buckets.contains_key(bucket) {
            self.buckets.insert(bucket.to_string(), DependencyMap::new());
        }
    }

    /// Look up one dependency value
    pub fn dependency(&self, bucket: &str, name: &str) -> Option<&str> {
        self.buckets
            .get(bucket)
            .and_then(|map| map.get(name))
            .map(String::as_str)
    }

    /// Name used in diagnostics: package name, then file path, then a placeholder
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.source.as_ref().map(|path| path.to_string()))
            .unwrap_or_else(|| "<unnamed>".to_string())
    }
}

impl BucketSet {
    /// Create a bucket set using the default override bucket name
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            override_bucket: DEFAULT_OVERRIDE_BUCKET.to_string(),
        }
    }

    /// Use a different bucket for forced resolutions (npm `overrides`, ...)
    pub fn with_override_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.override_bucket = bucket.into();
        self
    }

    /// Append a bucket name; returns false when it was already present
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn override_bucket(&self) -> &str {
        &self.override_bucket
    }

    /// Check if the override pre-pass applies to this set
    pub fn has_overrides(&self) -> bool {
        self.names.contains(&self.override_bucket)
    }

    /// Buckets merged in the regular pass (override bucket excluded)
    pub fn regular(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(move |name| *name != self.override_bucket)
    }
}
