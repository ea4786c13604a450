//! Version-constraint collision resolver and manifest merge engine for Manifold
//!
//! This crate decides how two version constraints for the same dependency
//! combine, and folds incoming manifests into an accumulator bucket by bucket,
//! using the override map to rescue collisions that cannot be combined.

pub mod collision;
pub mod merge;
pub mod report;

// Re-export main types
pub use collision::{resolve, resolve_detailed, Resolution, ResolutionMethod};
pub use merge::{merge, DependencyMerger};
pub use report::{MergeEvent, MergeReporter, NoopReporter, RecordingReporter, TracingReporter};

use manifold_core::MergeError;

/// Result type for merge operations
pub type MergeResult<T> = Result<T, MergeError>;
