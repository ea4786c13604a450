//! Utility functions and helpers.
//!
//! Common functionality used across multiple Manifold crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{is_directory_hint, manifest_path, normalize_path};
