//! Classification of dependency version values.
//!
//! A manifest value is not always a semver range: it may point at a git
//! repository, a tarball URL, a local path, an aliased package or a dist-tag.
//! [`classify`] sorts a value into one [`ConstraintKind`] by running ordered
//! checks, most specific first.

use super::range::{is_valid_pin, Range};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of forms a dependency value can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintKind {
    /// Exact version (`1.2.3`, `v1.2.3-rc.1`)
    Pin,
    /// Single-branch range (`^1.2.3`, `>=1 <2`, `1.x`)
    Range,
    /// Range with logical-or branches (`^1 || ^2`)
    Disjunction,
    /// Git remote or GitHub shorthand
    GitRef,
    /// Local file-system reference
    PathRef,
    /// Tarball or other HTTP URL
    UrlRef,
    /// `npm:` package alias
    AliasRef,
    /// Dist-tag such as `latest` or `next`
    Tag,
    /// Matches anything (`*`, `x`, empty)
    Wildcard,
    /// None of the above
    Unrecognized,
}

impl ConstraintKind {
    /// Check if this value takes part in range intersection
    pub fn is_semver(&self) -> bool {
        matches!(
            self,
            ConstraintKind::Pin
                | ConstraintKind::Range
                | ConstraintKind::Disjunction
                | ConstraintKind::Wildcard
        )
    }

    /// Check if this value refers to a source location instead of a version
    pub fn is_source_reference(&self) -> bool {
        matches!(
            self,
            ConstraintKind::GitRef | ConstraintKind::PathRef | ConstraintKind::UrlRef
        )
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Pin => "pin",
            ConstraintKind::Range => "range",
            ConstraintKind::Disjunction => "disjunction",
            ConstraintKind::GitRef => "git reference",
            ConstraintKind::PathRef => "path reference",
            ConstraintKind::UrlRef => "url reference",
            ConstraintKind::AliasRef => "package alias",
            ConstraintKind::Tag => "tag",
            ConstraintKind::Wildcard => "wildcard",
            ConstraintKind::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// Classify a dependency value
pub fn classify(value: &str) -> ConstraintKind {
    let value = value.trim();

    if is_wildcard(value) {
        return ConstraintKind::Wildcard;
    }
    if is_valid_pin(value) {
        return ConstraintKind::Pin;
    }
    if let Ok(range) = Range::parse(value) {
        return if range.is_disjunction() {
            ConstraintKind::Disjunction
        } else {
            ConstraintKind::Range
        };
    }
    if is_git(value) {
        return ConstraintKind::GitRef;
    }
    if is_url(value) {
        return ConstraintKind::UrlRef;
    }
    if is_path(value) {
        return ConstraintKind::PathRef;
    }
    if value.starts_with("npm:") {
        return ConstraintKind::AliasRef;
    }
    if is_tag(value) {
        return ConstraintKind::Tag;
    }

    ConstraintKind::Unrecognized
}

fn is_wildcard(value: &str) -> bool {
    matches!(value, "" | "*" | "x" | "X")
}

fn is_git(value: &str) -> bool {
    ["git@", "git://", "git+", "github:"]
        .iter()
        .any(|prefix| value.starts_with(prefix))
        || is_github_shorthand(value)
}

/// `owner/repo`, optionally followed by `#committish`
fn is_github_shorthand(value: &str) -> bool {
    let repo = value.split_once('#').map_or(value, |(repo, _)| repo);
    let Some((owner, name)) = repo.split_once('/') else {
        return false;
    };
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
    !owner.is_empty()
        && !name.is_empty()
        && !owner.starts_with('.')
        && owner.chars().all(allowed)
        && name.chars().all(allowed)
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn is_path(value: &str) -> bool {
    ["file:", "./", "../", "~/", "/"]
        .iter()
        .any(|prefix| value.starts_with(prefix))
}

fn is_tag(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() && first != 'v' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        for value in ["*", " * ", "", "  ", "x", "X"] {
            assert_eq!(classify(value), ConstraintKind::Wildcard, "value: {:?}", value);
        }
    }

    #[test]
    fn test_pins_before_ranges() {
        assert_eq!(classify("1.2.3"), ConstraintKind::Pin);
        assert_eq!(classify("v1.2.3-rc.0"), ConstraintKind::Pin);
        assert_eq!(classify("=1.2.3"), ConstraintKind::Range);
        assert_eq!(classify("^1.2.3"), ConstraintKind::Range);
        assert_eq!(classify("1.2"), ConstraintKind::Range);
        assert_eq!(classify("1.0.0 - 2.0.0"), ConstraintKind::Range);
    }

    #[test]
    fn test_disjunction() {
        assert_eq!(classify("^1.0.0 || ^2.0.0"), ConstraintKind::Disjunction);
    }

    #[test]
    fn test_source_references() {
        assert_eq!(classify("git@github.com:user/repo.git"), ConstraintKind::GitRef);
        assert_eq!(classify("git://github.com/user/repo.git"), ConstraintKind::GitRef);
        assert_eq!(classify("git+https://github.com/user/repo.git"), ConstraintKind::GitRef);
        assert_eq!(classify("userfrosting/UserFrosting"), ConstraintKind::GitRef);
        assert_eq!(classify("foo/foo.bar#v1.0.0"), ConstraintKind::GitRef);

        assert_eq!(classify("https://example.com/pkg.tgz"), ConstraintKind::UrlRef);
        assert_eq!(classify("http://example.com/pkg.tgz"), ConstraintKind::UrlRef);

        assert_eq!(classify("file:./foo/bar"), ConstraintKind::PathRef);
        assert_eq!(classify("../sibling"), ConstraintKind::PathRef);

        assert!(classify("file:../x").is_source_reference());
    }

    #[test]
    fn test_alias_and_tags() {
        assert_eq!(classify("npm:jquery@latest"), ConstraintKind::AliasRef);

        for value in ["latest", "ALPHA", "beta.1", "beta-1", "next"] {
            assert_eq!(classify(value), ConstraintKind::Tag, "value: {}", value);
        }
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(classify("thing with spaces"), ConstraintKind::Unrecognized);
        assert_eq!(classify("~~~~~~~"), ConstraintKind::Unrecognized);
        assert_eq!(classify("v1.2.3-rc.A.."), ConstraintKind::Unrecognized);
    }

    #[test]
    fn test_semver_kinds() {
        assert!(classify("1.0.0").is_semver());
        assert!(classify("^1 || ^2").is_semver());
        assert!(classify("*").is_semver());
        assert!(!classify("latest").is_semver());
        assert!(!classify("npm:left-pad@1.0.0").is_semver());
    }
}
