//! Path utilities for manifest locations.
//!
//! Manifest arguments may name a file or a directory. A trailing separator
//! marks a directory, in which case the kind's default file name is appended.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut components: Vec<Utf8Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {},
            Utf8Component::ParentDir => match components.last() {
                Some(Utf8Component::Normal(_)) => {
                    components.pop();
                },
                // Nothing above the root
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {},
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }

    if components.is_empty() {
        return Utf8PathBuf::from(".");
    }
    components.iter().collect()
}

/// Check if the argument ends in a path separator
pub fn is_directory_hint(raw: &str) -> bool {
    raw.ends_with('/') || raw.ends_with('\\')
}

/// Resolve a manifest argument to a file path
///
/// `pkgs/app/` becomes `pkgs/app/<default_file>`; anything else is used as
/// given. The result is normalized.
pub fn manifest_path(raw: &str, default_file: &str) -> Utf8PathBuf {
    let trimmed = raw.trim();
    if is_directory_hint(trimmed) {
        let dir = trimmed.trim_end_matches(['/', '\\']);
        let dir = if dir.is_empty() && trimmed.starts_with('/') { "/" } else { dir };
        return normalize_path(&Utf8Path::new(dir).join(default_file));
    }
    normalize_path(Utf8Path::new(trimmed))
}
