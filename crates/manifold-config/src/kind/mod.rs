//! Supported manifest kinds and their dependency buckets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use manifold_core::{BucketSet, ManifoldError};

use crate::ConfigResult;

const NPM_BUCKETS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];
const YARN_BUCKETS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
    "resolutions",
];
const BOWER_BUCKETS: &[&str] = &["dependencies", "devDependencies", "resolutions"];

/// Package manager whose manifest format is being merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    Npm,
    Yarn,
    Bower,
}

impl ManifestKind {
    pub const ALL: [ManifestKind; 3] = [ManifestKind::Npm, ManifestKind::Yarn, ManifestKind::Bower];

    /// File name appended to directory arguments
    pub fn default_file(&self) -> &'static str {
        match self {
            ManifestKind::Npm | ManifestKind::Yarn => "package.json",
            ManifestKind::Bower => "bower.json",
        }
    }

    /// Dependency buckets merged for this kind, in merge order
    pub fn buckets(&self) -> &'static [&'static str] {
        match self {
            ManifestKind::Npm => NPM_BUCKETS,
            ManifestKind::Yarn => YARN_BUCKETS,
            ManifestKind::Bower => BOWER_BUCKETS,
        }
    }

    /// Bucket set for this kind with extra bucket names appended
    pub fn bucket_set(&self, extra: &[String]) -> BucketSet {
        let mut set = BucketSet::new(self.buckets().iter().copied());
        for bucket in extra {
            set.insert(bucket.as_str());
        }
        set
    }

    /// Check if manifests of this kind must carry a `version` field
    pub fn requires_version(&self) -> bool {
        matches!(self, ManifestKind::Npm | ManifestKind::Yarn)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestKind::Npm => "npm",
            ManifestKind::Yarn => "yarn",
            ManifestKind::Bower => "bower",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestKind {
    type Err = ManifoldError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Ok(ManifestKind::Npm),
            "yarn" => Ok(ManifestKind::Yarn),
            "bower" => Ok(ManifestKind::Bower),
            other => Err(ManifoldError::ConfigValidation {
                field: "kind".to_string(),
                reason: format!("unknown manifest kind '{}', expected npm, yarn or bower", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_files() {
        assert_eq!(ManifestKind::Npm.default_file(), "package.json");
        assert_eq!(ManifestKind::Yarn.default_file(), "package.json");
        assert_eq!(ManifestKind::Bower.default_file(), "bower.json");
    }

    #[test]
    fn test_override_bucket_support() {
        assert!(!ManifestKind::Npm.bucket_set(&[]).has_overrides());
        assert!(ManifestKind::Yarn.bucket_set(&[]).has_overrides());
        assert!(ManifestKind::Bower.bucket_set(&[]).has_overrides());
    }

    #[test]
    fn test_extra_buckets_are_appended_once() {
        let set = ManifestKind::Bower.bucket_set(&["bundleDependencies".to_string(), "dependencies".to_string()]);
        let names: Vec<_> = set.iter().collect();
        assert_eq!(names, vec!["dependencies", "devDependencies", "resolutions", "bundleDependencies"]);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("npm".parse::<ManifestKind>().unwrap(), ManifestKind::Npm);
        assert_eq!(" Yarn ".parse::<ManifestKind>().unwrap(), ManifestKind::Yarn);
        assert!(matches!(
            "pnpm".parse::<ManifestKind>(),
            Err(ManifoldError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_version_requirement() {
        assert!(ManifestKind::Npm.requires_version());
        assert!(!ManifestKind::Bower.requires_version());
    }
}
