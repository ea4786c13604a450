//! npm-dialect version ranges.
//!
//! Parses range expressions such as `^1.2.3`, `>=1.0.0 <2.0.0`, `1.x`,
//! `1.2.3 - 2.0.0` and `^1.0.0 || ^2.0.0` into comparator sets over
//! [`semver::Version`], and answers matching and satisfiability questions.
//! Tilde, caret, hyphen and X-ranges are desugared into plain bounds at parse
//! time, so every comparator set is a conjunction of `<`, `<=`, `>`, `>=` and
//! `=` comparators.

use semver::{Prerelease, Version};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Marker separating the branches of a disjunction
pub const LOGICAL_OR: &str = "||";

/// Largest version component accepted (npm's `MAX_SAFE_INTEGER`)
pub const MAX_COMPONENT: u64 = 9_007_199_254_740_991;

/// Union of comparator sets (`a || b || c`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub sets: Vec<ComparatorSet>,
}

/// Conjunction of comparators; an empty set matches every version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparatorSet {
    pub comparators: Vec<Comparator>,
}

/// Individual version comparator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub version: Version,
}

/// Comparison operator for desugared comparators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Exact,     // =1.0.0
    Greater,   // >1.0.0
    GreaterEq, // >=1.0.0
    Less,      // <1.0.0
    LessEq,    // <=1.0.0
}

/// Range parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("Invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("Invalid prerelease identifier: {prerelease}")]
    InvalidPrerelease { prerelease: String },

    #[error("Operator '{operator}' is not followed by a version")]
    DanglingOperator { operator: String },
}

/// Operator written in front of a partial version, before desugaring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    None,
    Exact,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Tilde,
    Caret,
}

/// Version with possibly-wildcard components (`1`, `1.2`, `1.x`, `*`)
#[derive(Debug, Clone, PartialEq, Eq)]
struct PartialVersion {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    prerelease: Prerelease,
}

impl Range {
    /// Parse a range expression
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let trimmed = input.trim();

        if !trimmed.contains(LOGICAL_OR) {
            return Ok(Range {
                sets: vec![ComparatorSet::parse(trimmed)?],
            });
        }

        let mut sets = Vec::new();
        for branch in trimmed.split(LOGICAL_OR) {
            // An empty branch matches any version
            sets.push(ComparatorSet::parse(branch.trim())?);
        }

        Ok(Range { sets })
    }

    /// Check if a version matches this range
    pub fn matches(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set.matches(version))
    }

    /// Check if at least one version can match this range
    pub fn is_satisfiable(&self) -> bool {
        self.sets.iter().any(ComparatorSet::is_satisfiable)
    }

    /// Check if this range has more than one branch
    pub fn is_disjunction(&self) -> bool {
        self.sets.len() > 1
    }
}

impl std::str::FromStr for Range {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Range::parse(s)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, set) in self.sets.iter().enumerate() {
            if index > 0 {
                write!(f, " {} ", LOGICAL_OR)?;
            }
            write!(f, "{}", set)?;
        }
        Ok(())
    }
}

impl ComparatorSet {
    /// Parse one branch of a range (no `||`)
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let tokens = tokenize(input)?;

        if tokens.is_empty() {
            return Ok(ComparatorSet::default());
        }

        // Hyphen range: `A - B`
        if tokens.len() == 3 && tokens[1] == "-" {
            let (prefix_low, low) = parse_simple(&tokens[0])?;
            let (prefix_high, high) = parse_simple(&tokens[2])?;
            if prefix_low != Prefix::None || prefix_high != Prefix::None {
                return Err(RangeError::InvalidFormat {
                    input: input.to_string(),
                });
            }
            return Ok(ComparatorSet {
                comparators: desugar_hyphen(&low, &high),
            });
        }

        let mut comparators = Vec::new();
        for token in &tokens {
            let (prefix, partial) = parse_simple(token)?;
            comparators.extend(desugar(prefix, &partial));
        }

        Ok(ComparatorSet { comparators })
    }

    /// Check if a version matches every comparator in this set
    pub fn matches(&self, version: &Version) -> bool {
        if !self.comparators.iter().all(|comp| comp.matches(version)) {
            return false;
        }

        if version.pre.is_empty() {
            return true;
        }

        // A prerelease only matches when some comparator opts into
        // prereleases of the same major.minor.patch.
        self.comparators.iter().any(|comp| {
            !comp.version.pre.is_empty()
                && comp.version.major == version.major
                && comp.version.minor == version.minor
                && comp.version.patch == version.patch
        })
    }

    /// Tightest lower and upper bounds of this set
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::default();
        for comp in &self.comparators {
            match comp.op {
                Op::Exact => {
                    bounds.raise(Bound::inclusive(comp.version.clone()));
                    bounds.lower_ceiling(Bound::inclusive(comp.version.clone()));
                },
                Op::Greater => bounds.raise(Bound::exclusive(comp.version.clone())),
                Op::GreaterEq => bounds.raise(Bound::inclusive(comp.version.clone())),
                Op::Less => bounds.lower_ceiling(Bound::exclusive(comp.version.clone())),
                Op::LessEq => bounds.lower_ceiling(Bound::inclusive(comp.version.clone())),
            }
        }
        bounds
    }

    /// Check if the bounds of this set leave room for any version
    pub fn is_satisfiable(&self) -> bool {
        self.bounds().is_satisfiable()
    }

    /// Check if any comparator carries a prerelease tag
    pub fn has_prerelease(&self) -> bool {
        self.comparators.iter().any(|comp| !comp.version.pre.is_empty())
    }
}

impl fmt::Display for ComparatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comparators.is_empty() {
            return write!(f, "*");
        }
        for (index, comp) in self.comparators.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", comp)?;
        }
        Ok(())
    }
}

impl Comparator {
    pub fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    /// Check if a version matches this comparator (ignores prerelease gating)
    pub fn matches(&self, version: &Version) -> bool {
        let ordering = precedence_cmp(version, &self.version);
        match self.op {
            Op::Exact => ordering == Ordering::Equal,
            Op::Greater => ordering == Ordering::Greater,
            Op::GreaterEq => ordering != Ordering::Less,
            Op::Less => ordering == Ordering::Less,
            Op::LessEq => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Exact => "",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
            Op::Less => "<",
            Op::LessEq => "<=",
        };
        write!(f, "{}{}", op, self.version)
    }
}

/// One end of an interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(version: Version) -> Self {
        Self { version, inclusive: true }
    }

    pub fn exclusive(version: Version) -> Self {
        Self { version, inclusive: false }
    }
}

/// Interval described by a comparator set; `None` means unbounded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bounds {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl Bounds {
    /// Keep the higher of the current and the given lower bound
    pub fn raise(&mut self, bound: Bound) {
        let replace = match &self.lower {
            None => true,
            Some(current) => match precedence_cmp(&bound.version, &current.version) {
                Ordering::Greater => true,
                Ordering::Equal => current.inclusive && !bound.inclusive,
                Ordering::Less => false,
            },
        };
        if replace {
            self.lower = Some(bound);
        }
    }

    /// Keep the lower of the current and the given upper bound
    pub fn lower_ceiling(&mut self, bound: Bound) {
        let replace = match &self.upper {
            None => true,
            Some(current) => match precedence_cmp(&bound.version, &current.version) {
                Ordering::Less => true,
                Ordering::Equal => current.inclusive && !bound.inclusive,
                Ordering::Greater => false,
            },
        };
        if replace {
            self.upper = Some(bound);
        }
    }

    /// Check if the interval contains at least one version
    pub fn is_satisfiable(&self) -> bool {
        let lower = self
            .lower
            .clone()
            .unwrap_or_else(|| Bound::inclusive(minimum_version()));

        match &self.upper {
            None => true,
            Some(upper) => match precedence_cmp(&lower.version, &upper.version) {
                Ordering::Less => true,
                Ordering::Equal => lower.inclusive && upper.inclusive,
                Ordering::Greater => false,
            },
        }
    }

    /// The single version this interval admits, if it is a point
    pub fn single_version(&self) -> Option<&Version> {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper))
                if lower.inclusive
                    && upper.inclusive
                    && precedence_cmp(&lower.version, &upper.version) == Ordering::Equal =>
            {
                Some(&lower.version)
            },
            _ => None,
        }
    }
}

/// Check if the input is a single, exact version
pub fn is_valid_pin(input: &str) -> bool {
    parse_pin(input).is_ok()
}

/// Check if the input is any expression the range grammar accepts
pub fn is_valid_range(input: &str) -> bool {
    Range::parse(input).is_ok()
}

/// Parse an exact version, allowing surrounding whitespace and a leading `v`
pub fn parse_pin(input: &str) -> Result<Version, RangeError> {
    let trimmed = input.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let version = Version::parse(bare).map_err(|_| RangeError::InvalidFormat {
        input: trimmed.to_string(),
    })?;

    for component in [version.major, version.minor, version.patch] {
        if component > MAX_COMPONENT {
            return Err(RangeError::InvalidNumber {
                component: component.to_string(),
            });
        }
    }
    Ok(version)
}

/// Compare by semver precedence, ignoring build metadata
pub fn precedence_cmp(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// Smallest version in the total order (`0.0.0-0`)
pub fn minimum_version() -> Version {
    let mut version = Version::new(0, 0, 0);
    version.pre = Prerelease::new("0").unwrap_or(Prerelease::EMPTY);
    version
}

/// Split a branch into simple-range tokens, gluing bare operators to the
/// version that follows them (`>= 1.2.3` becomes `>=1.2.3`).
fn tokenize(input: &str) -> Result<Vec<String>, RangeError> {
    let mut tokens = Vec::new();
    let mut pending_operator: Option<String> = None;

    for word in input.split_whitespace() {
        let is_operator = word.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^'));
        if is_operator {
            if let Some(operator) = pending_operator.take() {
                return Err(RangeError::DanglingOperator { operator });
            }
            pending_operator = Some(word.to_string());
            continue;
        }

        match pending_operator.take() {
            Some(operator) => tokens.push(format!("{}{}", operator, word)),
            None => tokens.push(word.to_string()),
        }
    }

    if let Some(operator) = pending_operator {
        return Err(RangeError::DanglingOperator { operator });
    }

    Ok(tokens)
}

/// Split a simple range into its prefix and partial version
fn parse_simple(token: &str) -> Result<(Prefix, PartialVersion), RangeError> {
    let (prefix, rest) = if let Some(stripped) = token.strip_prefix("~>") {
        (Prefix::Tilde, stripped)
    } else if let Some(stripped) = token.strip_prefix('~') {
        (Prefix::Tilde, stripped)
    } else if let Some(stripped) = token.strip_prefix('^') {
        (Prefix::Caret, stripped)
    } else if let Some(stripped) = token.strip_prefix(">=") {
        (Prefix::GreaterEq, stripped)
    } else if let Some(stripped) = token.strip_prefix("<=") {
        (Prefix::LessEq, stripped)
    } else if let Some(stripped) = token.strip_prefix('>') {
        (Prefix::Greater, stripped)
    } else if let Some(stripped) = token.strip_prefix('<') {
        (Prefix::Less, stripped)
    } else if let Some(stripped) = token.strip_prefix('=') {
        (Prefix::Exact, stripped)
    } else {
        (Prefix::None, token)
    };

    let rest = rest.strip_prefix('v').unwrap_or(rest);
    if rest.is_empty() {
        return Err(RangeError::DanglingOperator {
            operator: token.to_string(),
        });
    }

    Ok((prefix, PartialVersion::parse(rest)?))
}

impl PartialVersion {
    fn parse(input: &str) -> Result<Self, RangeError> {
        // Build metadata never affects matching
        let without_build = match input.split_once('+') {
            Some((version, build)) => {
                if build.is_empty() {
                    return Err(RangeError::InvalidFormat {
                        input: input.to_string(),
                    });
                }
                version
            },
            None => input,
        };

        let (core, prerelease) = match without_build.split_once('-') {
            Some((core, pre)) => {
                if pre.is_empty() {
                    return Err(RangeError::InvalidPrerelease {
                        prerelease: pre.to_string(),
                    });
                }
                let prerelease = Prerelease::new(pre).map_err(|_| RangeError::InvalidPrerelease {
                    prerelease: pre.to_string(),
                })?;
                (core, prerelease)
            },
            None => (without_build, Prerelease::EMPTY),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(RangeError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let mut components = [None, None, None];
        let mut wildcard_seen = false;
        for (index, part) in parts.iter().enumerate() {
            let value = parse_component(part)?;
            // Anything after a wildcard is a wildcard too (`1.x.3` == `1.x`)
            if value.is_none() {
                wildcard_seen = true;
            }
            components[index] = if wildcard_seen { None } else { value };
        }

        let partial = PartialVersion {
            major: components[0],
            minor: components[1],
            patch: components[2],
            prerelease,
        };

        if !partial.prerelease.is_empty() && !partial.is_full() {
            return Err(RangeError::InvalidFormat {
                input: input.to_string(),
            });
        }

        Ok(partial)
    }

    fn is_full(&self) -> bool {
        self.major.is_some() && self.minor.is_some() && self.patch.is_some()
    }

    /// Fill missing components with zero
    fn floor(&self) -> Version {
        let mut version = Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        version.pre = self.prerelease.clone();
        version
    }
}

fn parse_component(part: &str) -> Result<Option<u64>, RangeError> {
    if matches!(part, "x" | "X" | "*") {
        return Ok(None);
    }
    let leading_zero = part.len() > 1 && part.starts_with('0');
    if part.is_empty() || leading_zero || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(RangeError::InvalidNumber {
            component: part.to_string(),
        });
    }
    match part.parse::<u64>() {
        Ok(number) if number <= MAX_COMPONENT => Ok(Some(number)),
        _ => Err(RangeError::InvalidNumber {
            component: part.to_string(),
        }),
    }
}

fn ge(version: Version) -> Comparator {
    Comparator::new(Op::GreaterEq, version)
}

fn lt(version: Version) -> Comparator {
    Comparator::new(Op::Less, version)
}

/// Comparator that no version satisfies
fn nothing() -> Comparator {
    lt(minimum_version())
}

/// Lower-bound and exclusive upper-bound window for an X-range
fn x_window(partial: &PartialVersion) -> Vec<Comparator> {
    match (partial.major, partial.minor, partial.patch) {
        (None, _, _) => Vec::new(),
        (Some(major), None, _) => vec![
            ge(Version::new(major, 0, 0)),
            lt(Version::new(major + 1, 0, 0)),
        ],
        (Some(major), Some(minor), None) => vec![
            ge(Version::new(major, minor, 0)),
            lt(Version::new(major, minor + 1, 0)),
        ],
        (Some(_), Some(_), Some(_)) => vec![Comparator::new(Op::Exact, partial.floor())],
    }
}

fn desugar(prefix: Prefix, partial: &PartialVersion) -> Vec<Comparator> {
    match prefix {
        Prefix::None | Prefix::Exact => x_window(partial),
        Prefix::Tilde => desugar_tilde(partial),
        Prefix::Caret => desugar_caret(partial),
        Prefix::Greater => match (partial.major, partial.minor, partial.patch) {
            (None, _, _) => vec![nothing()],
            (Some(major), None, _) => vec![ge(Version::new(major + 1, 0, 0))],
            (Some(major), Some(minor), None) => vec![ge(Version::new(major, minor + 1, 0))],
            _ => vec![Comparator::new(Op::Greater, partial.floor())],
        },
        Prefix::GreaterEq => match partial.major {
            None => Vec::new(),
            Some(_) => vec![ge(partial.floor())],
        },
        Prefix::Less => match partial.major {
            None => vec![nothing()],
            Some(_) => vec![lt(partial.floor())],
        },
        Prefix::LessEq => match (partial.major, partial.minor, partial.patch) {
            (None, _, _) => Vec::new(),
            (Some(major), None, _) => vec![lt(Version::new(major + 1, 0, 0))],
            (Some(major), Some(minor), None) => vec![lt(Version::new(major, minor + 1, 0))],
            _ => vec![Comparator::new(Op::LessEq, partial.floor())],
        },
    }
}

/// `~1.2.3` allows `>=1.2.3 <1.3.0`; `~1` allows `>=1.0.0 <2.0.0`
fn desugar_tilde(partial: &PartialVersion) -> Vec<Comparator> {
    match (partial.major, partial.minor) {
        (None, _) => Vec::new(),
        (Some(major), None) => vec![
            ge(Version::new(major, 0, 0)),
            lt(Version::new(major + 1, 0, 0)),
        ],
        (Some(major), Some(minor)) => vec![
            ge(partial.floor()),
            lt(Version::new(major, minor + 1, 0)),
        ],
    }
}

/// `^1.2.3` allows `>=1.2.3 <2.0.0`; zero majors narrow the window
fn desugar_caret(partial: &PartialVersion) -> Vec<Comparator> {
    let Some(major) = partial.major else {
        return Vec::new();
    };
    let ceiling = match (partial.minor, partial.patch) {
        (None, _) => Version::new(major + 1, 0, 0),
        (Some(minor), None) if major == 0 => Version::new(0, minor + 1, 0),
        (Some(_), None) => Version::new(major + 1, 0, 0),
        (Some(minor), Some(patch)) => caret_ceiling(&Version::new(major, minor, patch)),
    };
    vec![ge(partial.floor()), lt(ceiling)]
}

/// Exclusive upper bound of `^version`
pub fn caret_ceiling(version: &Version) -> Version {
    if version.major > 0 {
        Version::new(version.major + 1, 0, 0)
    } else if version.minor > 0 {
        Version::new(0, version.minor + 1, 0)
    } else {
        Version::new(0, 0, version.patch + 1)
    }
}

/// Exclusive upper bound of `~version`
pub fn tilde_ceiling(version: &Version) -> Version {
    Version::new(version.major, version.minor + 1, 0)
}

fn desugar_hyphen(low: &PartialVersion, high: &PartialVersion) -> Vec<Comparator> {
    let mut comparators = Vec::new();

    if low.major.is_some() {
        comparators.push(ge(low.floor()));
    }

    match (high.major, high.minor, high.patch) {
        (None, _, _) => {},
        (Some(major), None, _) => comparators.push(lt(Version::new(major + 1, 0, 0))),
        (Some(major), Some(minor), None) => comparators.push(lt(Version::new(major, minor + 1, 0))),
        _ => comparators.push(Comparator::new(Op::LessEq, high.floor())),
    }

    comparators
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(input: &str) -> Version {
        Version::parse(input).unwrap()
    }

    fn range(input: &str) -> Range {
        Range::parse(input).unwrap()
    }

    #[test]
    fn test_pin_parsing() {
        assert!(is_valid_pin("1.2.3"));
        assert!(is_valid_pin(" 1.2.3 "));
        assert!(is_valid_pin("v1.2.3"));
        assert!(is_valid_pin("1.2.3-alpha.1+build.5"));

        assert!(!is_valid_pin("1.2"));
        assert!(!is_valid_pin("=1.2.3"));
        assert!(!is_valid_pin("^1.2.3"));
        assert!(!is_valid_pin("01.2.3"));
        assert!(!is_valid_pin("latest"));
    }

    #[test]
    fn test_valid_ranges() {
        for input in [
            "",
            "*",
            "x",
            "1",
            "1.2",
            "1.x",
            "1.2.*",
            "^1.2.3",
            "~1.2.3",
            "~>1.2",
            ">=1.2.3 <2.0.0",
            ">= 1.2.3",
            "=v1.0.0",
            "1.2.3 - 2.3.4",
            "^1.0.0 || ^2.0.0",
            "^1.0.0 ^3.0.0",
            "1.2.3-beta.2",
        ] {
            assert!(is_valid_range(input), "expected '{}' to be a valid range", input);
        }
    }

    #[test]
    fn test_invalid_ranges() {
        for input in [
            "latest",
            "git://github.com/user/repo.git",
            "file:../local",
            "npm:jquery@latest",
            "user/repo",
            "1.2.3.4",
            ">=",
            "18446744073709551615.0.0",
            "^18446744073709551615.0.0",
            "18446744073709551615.x",
            "~1.9007199254740992",
            "1.x-beta",
            "01.2.3",
        ] {
            assert!(!is_valid_range(input), "expected '{}' to be rejected", input);
        }
    }

    #[test]
    fn test_caret_matching() {
        let req = range("^1.2.3");
        assert!(req.matches(&v("1.2.3")));
        assert!(req.matches(&v("1.9.0")));
        assert!(!req.matches(&v("2.0.0")));
        assert!(!req.matches(&v("1.2.2")));

        let zero = range("^0.2.3");
        assert!(zero.matches(&v("0.2.9")));
        assert!(!zero.matches(&v("0.3.0")));

        let patch_only = range("^0.0.3");
        assert!(patch_only.matches(&v("0.0.3")));
        assert!(!patch_only.matches(&v("0.0.4")));
    }

    #[test]
    fn test_tilde_and_x_ranges() {
        let tilde = range("~1.2.3");
        assert!(tilde.matches(&v("1.2.9")));
        assert!(!tilde.matches(&v("1.3.0")));

        let x = range("1.x");
        assert!(x.matches(&v("1.0.0")));
        assert!(x.matches(&v("1.99.0")));
        assert!(!x.matches(&v("2.0.0")));

        let any = range("*");
        assert!(any.matches(&v("0.0.1")));
        assert!(any.matches(&v("42.0.0")));
    }

    #[test]
    fn test_operator_x_ranges() {
        assert!(range(">1").matches(&v("2.0.0")));
        assert!(!range(">1").matches(&v("1.9.9")));
        assert!(range("<=1.2").matches(&v("1.2.9")));
        assert!(!range("<=1.2").matches(&v("1.3.0")));
        assert!(!range("<1.2").matches(&v("1.2.0")));
        assert!(!range(">*").is_satisfiable());
    }

    #[test]
    fn test_hyphen_range() {
        let req = range("1.2.3 - 2.3");
        assert!(req.matches(&v("1.2.3")));
        assert!(req.matches(&v("2.3.9")));
        assert!(!req.matches(&v("2.4.0")));
        assert!(!req.matches(&v("1.2.2")));
    }

    #[test]
    fn test_disjunction() {
        let req = range("^1.0.0 || ^3.0.0");
        assert!(req.is_disjunction());
        assert!(req.matches(&v("1.5.0")));
        assert!(req.matches(&v("3.1.0")));
        assert!(!req.matches(&v("2.0.0")));
    }

    #[test]
    fn test_empty_branch_matches_anything() {
        let trailing = range("^1.0.0 ||");
        assert!(trailing.is_disjunction());
        assert!(trailing.matches(&v("7.0.0")));

        let middle = range("^1.0.0 || || ^2.0.0");
        assert_eq!(middle.sets.len(), 3);
        assert!(middle.matches(&v("5.0.0")));
    }

    #[test]
    fn test_component_limit() {
        let max = MAX_COMPONENT.to_string();
        let req = range(&format!("^{}.0.0", max));
        assert!(req.matches(&Version::new(MAX_COMPONENT, 3, 0)));
        assert!(range(&format!("{}.x", max)).is_satisfiable());

        assert!(is_valid_pin(&format!("{}.0.0", max)));
        assert!(!is_valid_pin("9007199254740992.0.0"));
        assert!(matches!(
            Range::parse("^9007199254740992.0.0"),
            Err(RangeError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_pin("1.18446744073709551615.0"),
            Err(RangeError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_prerelease_gating() {
        let req = range(">=1.2.3-alpha <2.0.0");
        assert!(req.matches(&v("1.2.3-beta")));
        assert!(!req.matches(&v("1.4.0-beta")));
        assert!(req.matches(&v("1.4.0")));

        assert!(!range("^1.0.0").matches(&v("1.5.0-rc.1")));
    }

    #[test]
    fn test_satisfiability() {
        assert!(range("^1.0.0 ^1.2.0").is_satisfiable());
        assert!(!range("^1.0.0 ^3.0.0").is_satisfiable());
        assert!(range("^1.0.0 ^3.0.0 || ^3.0.0").is_satisfiable());
        assert!(range("1.0.0 >=1.0.0").is_satisfiable());
        assert!(!range(">1.0.0 <=1.0.0").is_satisfiable());
    }

    #[test]
    fn test_display_desugared() {
        assert_eq!(range("^1.2.3").to_string(), ">=1.2.3 <2.0.0");
        assert_eq!(range("~1.2").to_string(), ">=1.2.0 <1.3.0");
        assert_eq!(range("1.2.3 || *").to_string(), "1.2.3 || *");
    }
}
