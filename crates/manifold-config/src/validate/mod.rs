//! Structural manifest validation
//!
//! Checks the shape the merge depends on: an object root, a string name, a
//! valid version for npm-style manifests, and dependency buckets that map
//! names to strings. Validators are built once per kind and shared through a
//! [`ValidatorCache`] owned by the loader.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use manifold_core::types::parse_pin;
use manifold_core::ManifoldError;

use crate::kind::ManifestKind;
use crate::ConfigResult;

/// Problems found in one manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn errors into `InvalidManifest`, handing back the warnings otherwise
    pub fn into_result(self, path: &str) -> ConfigResult<Vec<String>> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ManifoldError::InvalidManifest {
                path: path.to_string(),
                errors: self.errors,
            })
        }
    }
}

/// Validator for one manifest kind
#[derive(Debug, Clone)]
pub struct ManifestValidator {
    kind: ManifestKind,
    buckets: Vec<&'static str>,
}

impl ManifestValidator {
    pub fn new(kind: ManifestKind) -> Self {
        Self {
            kind,
            buckets: kind.buckets().to_vec(),
        }
    }

    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    /// Validate a parsed manifest document
    pub fn validate(&self, root: &Value) -> ValidationReport {
        let mut report = ValidationReport::default();

        let Some(object) = root.as_object() else {
            report.errors.push("root of the manifest must be an object".to_string());
            return report;
        };

        match object.get("name") {
            Some(Value::String(_)) => {},
            Some(_) => report.errors.push("'name' must be a string".to_string()),
            None => report.errors.push("'name' is required".to_string()),
        }

        if self.kind.requires_version() {
            match object.get("version") {
                Some(Value::String(version)) => {
                    if parse_pin(version).is_err() {
                        report
                            .errors
                            .push(format!("'version' must be a valid version, found '{}'", version));
                    }
                },
                Some(_) => report.errors.push("'version' must be a string".to_string()),
                None => report.errors.push("'version' is required".to_string()),
            }

            for field in ["description", "license"] {
                if !object.contains_key(field) {
                    report.warnings.push(format!("missing '{}' field", field));
                }
            }
        }

        for bucket in &self.buckets {
            if let Some(value) = object.get(*bucket) {
                check_bucket(bucket, value, &mut report.errors);
            }
        }

        report
    }
}

/// A bucket must be an object whose values are all strings
pub(crate) fn check_bucket(bucket: &str, value: &Value, errors: &mut Vec<String>) {
    let Some(entries) = value.as_object() else {
        errors.push(format!("'{}' must be an object", bucket));
        return;
    };

    for (name, constraint) in entries {
        if !constraint.is_string() {
            errors.push(format!("'{}.{}' must be a string", bucket, name));
        }
    }
}

/// Builds each kind's validator once and hands out shared references
#[derive(Debug, Default)]
pub struct ValidatorCache {
    validators: HashMap<ManifestKind, Arc<ManifestValidator>>,
}

impl ValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the validator for a kind, building it on first use
    pub fn get(&mut self, kind: ManifestKind) -> Arc<ManifestValidator> {
        self.validators
            .entry(kind)
            .or_insert_with(|| {
                debug!(%kind, "building manifest validator");
                Arc::new(ManifestValidator::new(kind))
            })
            .clone()
    }

    /// Number of validators built so far
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
