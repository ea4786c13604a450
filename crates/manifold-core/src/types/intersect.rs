//! Clean intersection of two version ranges.
//!
//! Reduces two single-branch ranges to the tightest bounds they share and
//! renders them back as range text, preferring `^`/`~` shorthand when the
//! bounds line up with a caret or tilde window. Ranges it cannot reduce
//! (logical-or branches, prerelease bounds) are reported as an
//! [`IntersectError`] so callers can pick their own fallback.

use super::range::{caret_ceiling, precedence_cmp, tilde_ceiling, Bound, Bounds, ComparatorSet, Range, RangeError};
use std::cmp::Ordering;
use thiserror::Error;

/// Why two ranges have no clean single-range intersection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntersectError {
    #[error("logical-or ranges cannot be intersected cleanly")]
    Disjunction,

    #[error("ranges do not overlap")]
    Disjoint,

    #[error("prerelease bounds cannot be intersected cleanly")]
    Prerelease,

    #[error(transparent)]
    Invalid(#[from] RangeError),
}

/// Intersect two range expressions into a single range expression
pub fn intersect(a: &str, b: &str) -> Result<String, IntersectError> {
    let left = single_set(a)?;
    let right = single_set(b)?;

    if left.has_prerelease() || right.has_prerelease() {
        return Err(IntersectError::Prerelease);
    }

    let mut bounds = left.bounds();
    if let Some(lower) = right.bounds().lower {
        bounds.raise(lower);
    }
    if let Some(upper) = right.bounds().upper {
        bounds.lower_ceiling(upper);
    }

    if !bounds.is_satisfiable() {
        return Err(IntersectError::Disjoint);
    }

    Ok(format_bounds(&bounds))
}

fn single_set(input: &str) -> Result<ComparatorSet, IntersectError> {
    let mut range = Range::parse(input)?;
    if range.is_disjunction() {
        return Err(IntersectError::Disjunction);
    }
    Ok(range.sets.pop().unwrap_or_default())
}

/// Render bounds as the shortest range text that describes them
fn format_bounds(bounds: &Bounds) -> String {
    if let Some(version) = bounds.single_version() {
        return version.to_string();
    }

    match (&bounds.lower, &bounds.upper) {
        (None, None) => "*".to_string(),
        (Some(lower), None) => format_lower(lower),
        (None, Some(upper)) => format_upper(upper),
        (Some(lower), Some(upper)) => {
            if lower.inclusive && !upper.inclusive {
                if precedence_cmp(&upper.version, &caret_ceiling(&lower.version)) == Ordering::Equal {
                    return format!("^{}", lower.version);
                }
                if precedence_cmp(&upper.version, &tilde_ceiling(&lower.version)) == Ordering::Equal {
                    return format!("~{}", lower.version);
                }
            }
            format!("{} {}", format_lower(lower), format_upper(upper))
        },
    }
}

fn format_lower(bound: &Bound) -> String {
    let op = if bound.inclusive { ">=" } else { ">" };
    format!("{}{}", op, bound.version)
}

fn format_upper(bound: &Bound) -> String {
    let op = if bound.inclusive { "<=" } else { "<" };
    format!("{}{}", op, bound.version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    #[test]
    fn test_identical_caret_ranges() {
        assert_eq!(intersect("^1.0.0", "^1.0.0").unwrap(), "^1.0.0");
    }

    #[test]
    fn test_narrowing_to_caret_shorthand() {
        assert_eq!(intersect("^1.0.0", ">=1.2.0").unwrap(), "^1.2.0");
        assert_eq!(intersect("1", "^1").unwrap(), "^1.0.0");
        assert_eq!(intersect(">=1", "^1.0.0").unwrap(), "^1.0.0");
    }

    #[test]
    fn test_narrowing_to_tilde_shorthand() {
        assert_eq!(intersect("^1.0.0", "~1.4.2").unwrap(), "~1.4.2");
        assert_eq!(intersect("1", "1.0").unwrap(), "~1.0.0");
    }

    #[test]
    fn test_explicit_bounds() {
        assert_eq!(intersect(">=1.2.0", "<1.8.0").unwrap(), ">=1.2.0 <1.8.0");
        assert_eq!(intersect(">1.0.0", "*").unwrap(), ">1.0.0");
        assert_eq!(intersect("*", "").unwrap(), "*");
    }

    #[test]
    fn test_pin_inside_range() {
        assert_eq!(intersect("^1.0.0", "1.4.0").unwrap(), "1.4.0");
        assert_eq!(intersect("=1.0.0", "1.0.0").unwrap(), "1.0.0");
    }

    #[test]
    fn test_disjoint_ranges() {
        assert_eq!(intersect("^1.0.0", "^3.0.0"), Err(IntersectError::Disjoint));
        assert_eq!(intersect("1.0.0", "1.0.1"), Err(IntersectError::Disjoint));
    }

    #[test]
    fn test_unreducible_forms() {
        assert_eq!(
            intersect("^1.0.0 || ^2.0.0", "^1.0.0"),
            Err(IntersectError::Disjunction)
        );
        assert_eq!(intersect("^1.0.0-beta", "^1.0.0"), Err(IntersectError::Prerelease));
        assert!(matches!(intersect("latest", "^1.0.0"), Err(IntersectError::Invalid(_))));
    }

    #[test]
    fn test_result_is_a_matching_range() {
        let merged = intersect("^1.0.0", ">=1.2.0 <1.6.0").unwrap();
        let range = Range::parse(&merged).unwrap();
        assert!(range.matches(&Version::new(1, 5, 0)));
        assert!(!range.matches(&Version::new(1, 1, 0)));
        assert!(!range.matches(&Version::new(1, 6, 0)));
    }
}
