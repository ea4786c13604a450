//! Error types and result aliases for Manifold operations.
//!
//! The merge engine raises three narrow errors (`ConstraintError`,
//! `ConflictError`, `InvalidArgumentError`); everything that crosses a crate
//! boundary into the loader or the CLI is folded into `ManifoldError`.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Why two version constraints could not be combined
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintFailure {
    #[error("an incoming semver range requires the current value to also be a valid semver range")]
    InvalidCurrent,

    #[error("the ranges contradict each other and cannot be combined into a valid range")]
    Contradiction,

    #[error("logical-or expansion produced an unusable range: {generated}")]
    InvalidExpansion { generated: String },

    #[error("range primitive failed: {0}")]
    Primitive(String),
}

/// Two version constraints for one dependency cannot be combined
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot merge version constraints '{current}' and '{incoming}': {reason}")]
pub struct ConstraintError {
    /// Value already held by the accumulator
    pub current: String,
    /// Value offered by the incoming manifest
    pub incoming: String,
    pub reason: ConstraintFailure,
}

/// A dependency collision that no override could rescue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Dependency conflict for '{dependency}' in '{bucket}'{}", origin_suffix(.origin))]
pub struct ConflictError {
    /// Dependency name
    pub dependency: String,
    /// Bucket the collision happened in
    pub bucket: String,
    /// File the incoming manifest was loaded from, when known
    pub origin: Option<Utf8PathBuf>,
    #[source]
    pub source: ConstraintError,
}

/// Caller-supplied configuration is structurally wrong
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid argument '{argument}': {reason}")]
pub struct InvalidArgumentError {
    pub argument: String,
    pub reason: String,
}

/// Failure of a whole merge call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),
}

/// Unified error type for all Manifold operations
#[derive(Error, Debug)]
pub enum ManifoldError {
    // Config errors
    #[error("Failed to parse manifold.toml: {message} at line {line}, column {column}")]
    TomlParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Failed to parse manifest: {message}")]
    JsonParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // Manifest errors
    #[error("Manifest {path} is invalid:\n  {}", .errors.join("\n  "))]
    InvalidManifest { path: String, errors: Vec<String> },

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    // Merge errors
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Manifold operations
pub type ManifoldResult<T> = Result<T, ManifoldError>;

fn origin_suffix(origin: &Option<Utf8PathBuf>) -> String {
    match origin {
        Some(path) => format!(" (from {})", path),
        None => String::new(),
    }
}

impl ConstraintError {
    pub fn new(current: &str, incoming: &str, reason: ConstraintFailure) -> Self {
        Self {
            current: current.to_string(),
            incoming: incoming.to_string(),
            reason,
        }
    }
}

impl InvalidArgumentError {
    pub fn new(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            argument: argument.into(),
            reason: reason.into(),
        }
    }
}

impl From<ConflictError> for ManifoldError {
    fn from(error: ConflictError) -> Self {
        ManifoldError::Merge(MergeError::Conflict(error))
    }
}

impl ManifoldError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ManifoldError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ManifoldError::Merge(MergeError::Conflict(_)) => Some(
                "Add an entry for the dependency to 'resolutions' to force a version, or align the ranges",
            ),
            ManifoldError::Constraint(_) => {
                Some("Use a range that overlaps the current one, or an exact version")
            },
            ManifoldError::Merge(MergeError::InvalidArgument(_))
            | ManifoldError::InvalidArgument(_) => {
                Some("Check the bucket names and manifest paths passed to the merge")
            },
            ManifoldError::InvalidManifest { .. } => {
                Some("Fix the listed fields; dependency buckets must map names to version strings")
            },
            ManifoldError::TomlParse { .. } => Some("Check the syntax of manifold.toml"),
            ManifoldError::Io { .. } => Some("Check that the file exists and is readable"),
            _ => None,
        }
    }
}
