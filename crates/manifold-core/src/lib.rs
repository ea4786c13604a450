//! # manifold-core
//!
//! Core types and utilities shared across all Manifold crates.
//!
//! This crate provides:
//! - An npm-dialect version range primitive (validity, matching, clean intersection)
//! - Classification of dependency values (pins, ranges, git/path/url references, tags)
//! - Manifest, DependencyMap and BucketSet types the merge engine works on
//! - Error types for the merge engine and the unified ManifoldError
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types and the range primitive
//! - `error`: Error types and result aliases
//! - `utils`: Path helpers for manifest locations

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{
    ConflictError, ConstraintError, ConstraintFailure, InvalidArgumentError, ManifoldError,
    ManifoldResult, MergeError,
};
pub use types::{classify, BucketSet, ConstraintKind, DependencyMap, Manifest};
