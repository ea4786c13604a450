//! Manifest loading and job configuration for Manifold
//!
//! This crate reads and writes package.json / bower.json manifests, validates
//! their structure, and handles manifold.toml merge jobs layered with
//! environment and command line overrides.

pub mod json;
pub mod kind;
pub mod loader;
pub mod merge;
pub mod toml;
pub mod validate;

// Re-export main types
pub use self::json::{PackageDocument, DEFAULT_INDENT};
pub use self::kind::ManifestKind;
pub use self::loader::{LoadedManifest, ManifestLoader};
pub use self::merge::{JobLayering, JobLoader, JobOverrides, JobSource};
pub use self::toml::{MergeJob, JOB_FILE};
pub use self::validate::{ManifestValidator, ValidationReport, ValidatorCache};

use manifold_core::ManifoldError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ManifoldError>;
