//! package.json / bower.json document handling
//!
//! A [`PackageDocument`] keeps the whole JSON file, in its original key order,
//! so fields the merge never touches survive a load/save round trip. Only the
//! dependency buckets are exchanged with the merge engine as a [`Manifest`].

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::{Map, Value};

use manifold_core::{BucketSet, DependencyMap, Manifest, ManifoldError};

use crate::validate::check_bucket;
use crate::ConfigResult;

/// Indentation used when writing manifests
pub const DEFAULT_INDENT: usize = 4;

/// Parsed manifest file
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDocument {
    root: Value,
    source: Option<Utf8PathBuf>,
}

impl PackageDocument {
    /// Wrap an already-parsed JSON value
    pub fn from_value(root: Value) -> Self {
        Self { root, source: None }
    }

    /// Parse manifest text
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let root = serde_json::from_str(content).map_err(|e| ManifoldError::JsonParse {
            message: format!("JSON parsing error: {}", e),
        })?;
        Ok(Self::from_value(root))
    }

    pub fn with_source(mut self, source: impl Into<Utf8PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn source(&self) -> Option<&Utf8Path> {
        self.source.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.root.get("name").and_then(Value::as_str)
    }

    /// Path or placeholder used in error messages
    pub fn display_path(&self) -> String {
        self.source
            .as_ref()
            .map(|path| path.to_string())
            .unwrap_or_else(|| "<inline>".to_string())
    }

    fn object_mut(&mut self) -> ConfigResult<&mut Map<String, Value>> {
        let path = self.display_path();
        self.root.as_object_mut().ok_or_else(|| ManifoldError::InvalidManifest {
            path,
            errors: vec!["root of the manifest must be an object".to_string()],
        })
    }

    /// Add an empty object for every bucket the document lacks
    pub fn ensure_buckets(&mut self, buckets: &BucketSet) -> ConfigResult<()> {
        let object = self.object_mut()?;
        for bucket in buckets.iter() {
            if !object.contains_key(bucket) {
                object.insert(bucket.to_string(), Value::Object(Map::new()));
            }
        }
        Ok(())
    }

    /// Extract the merge view of this document for the given buckets
    ///
    /// Buckets absent from the document are absent from the manifest.
    pub fn to_manifest(&self, buckets: &BucketSet) -> ConfigResult<Manifest> {
        let object = self.root.as_object().ok_or_else(|| ManifoldError::InvalidManifest {
            path: self.display_path(),
            errors: vec!["root of the manifest must be an object".to_string()],
        })?;

        let mut manifest = Manifest {
            name: self.name().map(str::to_string),
            source: self.source.clone(),
            ..Manifest::default()
        };
        let mut errors = Vec::new();

        for bucket in buckets.iter() {
            let Some(value) = object.get(bucket) else {
                continue;
            };
            check_bucket(bucket, value, &mut errors);

            let map: DependencyMap = value
                .as_object()
                .into_iter()
                .flatten()
                .filter_map(|(name, constraint)| {
                    constraint.as_str().map(|text| (name.clone(), text.to_string()))
                })
                .collect();
            manifest.buckets.insert(bucket.to_string(), map);
        }

        if !errors.is_empty() {
            return Err(ManifoldError::InvalidManifest {
                path: self.display_path(),
                errors,
            });
        }
        Ok(manifest)
    }

    /// Write merged buckets back into the document, keeping field order
    pub fn apply_manifest(&mut self, manifest: &Manifest) -> ConfigResult<()> {
        let object = self.object_mut()?;
        for (bucket, entries) in &manifest.buckets {
            let map: Map<String, Value> = entries
                .iter()
                .map(|(name, constraint)| (name.clone(), Value::String(constraint.clone())))
                .collect();
            object.insert(bucket.clone(), Value::Object(map));
        }
        Ok(())
    }

    /// Serialize with the given indent width and a trailing newline
    pub fn to_json_string(&self, indent: usize) -> ConfigResult<String> {
        let indent = " ".repeat(indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

        self.root
            .serialize(&mut serializer)
            .map_err(|e| ManifoldError::JsonParse {
                message: format!("JSON serialization error: {}", e),
            })?;

        let mut text = String::from_utf8(buffer).map_err(|e| ManifoldError::JsonParse {
            message: format!("JSON serialization produced invalid UTF-8: {}", e),
        })?;
        text.push('\n');
        Ok(text)
    }
}

/// Load and parse a manifest file
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<PackageDocument> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ManifoldError::io(format!("Failed to read {}", path), e))?;

    PackageDocument::parse(&content)
        .map(|document| document.with_source(path))
        .map_err(|e| match e {
            ManifoldError::JsonParse { message } => ManifoldError::JsonParse {
                message: format!("In file {}: {}", path, message),
            },
            other => other,
        })
}

/// Write a manifest file, creating its parent directory when needed
pub async fn save_to_file(document: &PackageDocument, path: &Utf8Path, indent: usize) -> ConfigResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ManifoldError::io(format!("Failed to create {}", parent), e))?;
    }

    let text = document.to_json_string(indent)?;
    tokio::fs::write(path, text)
        .await
        .map_err(|e| ManifoldError::io(format!("Failed to write {}", path), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn buckets() -> BucketSet {
        BucketSet::new(["dependencies", "devDependencies", "resolutions"])
    }

    #[test]
    fn test_parse_and_extract_manifest() {
        let json = r#"
{
  "name": "app",
  "version": "1.0.0",
  "dependencies": {
    "react": "^16.0.0",
    "left-pad": "^1.0.0"
  },
  "scripts": { "build": "tsc" }
}
"#;
        let document = PackageDocument::parse(json).unwrap().with_source("app/package.json");
        let manifest = document.to_manifest(&buckets()).unwrap();

        assert_eq!(manifest.name.as_deref(), Some("app"));
        assert_eq!(manifest.source.as_deref().map(|p| p.as_str()), Some("app/package.json"));
        let names: Vec<_> = manifest.bucket("dependencies").unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["react", "left-pad"]);
        assert!(!manifest.has_bucket("devDependencies"));
    }

    #[test]
    fn test_parse_error() {
        let error = PackageDocument::parse("{ not json").unwrap_err();
        assert!(matches!(error, ManifoldError::JsonParse { .. }));
    }

    #[test]
    fn test_non_string_constraint_is_rejected() {
        let document = PackageDocument::parse(r#"{ "name": "a", "dependencies": { "x": 1 } }"#).unwrap();
        match document.to_manifest(&buckets()) {
            Err(ManifoldError::InvalidManifest { errors, .. }) => {
                assert_eq!(errors, vec!["'dependencies.x' must be a string"]);
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_ensure_buckets_appends_missing() {
        let mut document = PackageDocument::parse(r#"{ "name": "t", "dependencies": { "a": "1.0.0" } }"#).unwrap();
        document.ensure_buckets(&buckets()).unwrap();

        let keys: Vec<_> = document.root().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "dependencies", "devDependencies", "resolutions"]);
        assert_eq!(document.root()["dependencies"]["a"], "1.0.0");
    }

    #[test]
    fn test_apply_manifest_keeps_other_fields() {
        let mut document = PackageDocument::parse(r#"{ "name": "t", "dependencies": {}, "private": true }"#).unwrap();
        let manifest = Manifest::new("t").with_bucket("dependencies", [("left-pad", "^2.0.0")]);

        document.apply_manifest(&manifest).unwrap();
        assert_eq!(document.root()["dependencies"]["left-pad"], "^2.0.0");
        assert_eq!(document.root()["private"], true);
        let keys: Vec<_> = document.root().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "dependencies", "private"]);
    }

    #[test]
    fn test_four_space_indent() {
        let document = PackageDocument::parse(r#"{"name":"t","dependencies":{"a":"1.0.0"}}"#).unwrap();
        let text = document.to_json_string(DEFAULT_INDENT).unwrap();
        assert_eq!(
            text,
            "{\n    \"name\": \"t\",\n    \"dependencies\": {\n        \"a\": \"1.0.0\"\n    }\n}\n"
        );
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let path = root.join("out").join("nested").join("package.json");

        let document = PackageDocument::parse(r#"{ "name": "t", "version": "1.0.0" }"#).unwrap();
        save_to_file(&document, &path, 2).await.unwrap();

        let loaded = load_from_file(&path).await.unwrap();
        assert_eq!(loaded.root(), document.root());
        assert_eq!(loaded.source(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let error = load_from_file(Utf8Path::new("/definitely/not/here/package.json"))
            .await
            .unwrap_err();
        assert!(matches!(error, ManifoldError::Io { .. }));
    }
}
