//! Core data types for Manifold.
//!
//! This module provides the fundamental types used throughout the workspace:
//! - Version ranges and the clean intersection primitive
//! - Classification of dependency values
//! - Manifests, dependency maps and bucket sets

pub mod constraint;
pub mod intersect;
pub mod manifest;
pub mod range;

// Re-export all public types
pub use constraint::{classify, ConstraintKind};
pub use intersect::{intersect, IntersectError};
pub use manifest::{BucketSet, DependencyMap, Manifest, DEFAULT_OVERRIDE_BUCKET};
pub use range::{is_valid_pin, is_valid_range, parse_pin, Comparator, ComparatorSet, Op, Range, RangeError};
