//! Version constraint collision resolution
//!
//! Decides the merged value for one dependency that both the accumulator and
//! an incoming manifest constrain. The checks run in a fixed order: a
//! non-semver incoming value wins outright, an invalid current value is
//! rejected, identical values pass through, and otherwise the two ranges are
//! intersected, expanded across `||` branches, or joined as a conjunction.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use manifold_core::types::range::{is_valid_pin, is_valid_range, Range, LOGICAL_OR};
use manifold_core::types::{intersect, IntersectError};
use manifold_core::{ConstraintError, ConstraintFailure};

/// Separator used when joining expanded branches
const BRANCH_JOIN: &str = " || ";

/// How a collision was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMethod {
    /// Incoming value is not semver and replaces the current one
    Override,
    /// Both values are the same text
    Identical,
    /// Clean intersection of two single-branch ranges
    Intersected,
    /// Per-branch intersection of logical-or ranges
    Expanded,
    /// Space-joined conjunction of both values
    Conjoined,
}

/// Merged value together with the step that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub value: String,
    pub method: ResolutionMethod,
}

impl Resolution {
    fn new(value: impl Into<String>, method: ResolutionMethod) -> Self {
        Self {
            value: value.into(),
            method,
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResolutionMethod::Override => "override",
            ResolutionMethod::Identical => "identical",
            ResolutionMethod::Intersected => "intersected",
            ResolutionMethod::Expanded => "expanded",
            ResolutionMethod::Conjoined => "conjoined",
        };
        f.write_str(name)
    }
}

/// Combine two constraints for the same dependency into one
pub fn resolve(current: &str, incoming: &str) -> Result<String, ConstraintError> {
    resolve_detailed(current, incoming).map(|resolution| resolution.value)
}

/// Combine two constraints and report which step settled the collision
pub fn resolve_detailed(current: &str, incoming: &str) -> Result<Resolution, ConstraintError> {
    if !is_semver(incoming) {
        warn!(current, incoming, "non-semver value overrides existing constraint");
        return Ok(Resolution::new(incoming, ResolutionMethod::Override));
    }

    if !is_semver(current) {
        return Err(ConstraintError::new(current, incoming, ConstraintFailure::InvalidCurrent));
    }

    if current == incoming {
        return Ok(Resolution::new(current, ResolutionMethod::Identical));
    }

    match intersect(current, incoming) {
        Ok(merged) => {
            debug!(current, incoming, merged = %merged, "ranges intersected");
            return Ok(Resolution::new(merged, ResolutionMethod::Intersected));
        },
        Err(IntersectError::Invalid(error)) => {
            return Err(ConstraintError::new(
                current,
                incoming,
                ConstraintFailure::Primitive(error.to_string()),
            ));
        },
        Err(_) => {},
    }

    let current_or = current.contains(LOGICAL_OR);
    let incoming_or = incoming.contains(LOGICAL_OR);

    if current_or || incoming_or {
        let generated = if current_or && incoming_or {
            branches(current)
                .map(|branch| expand(incoming, branch))
                .collect::<Vec<_>>()
                .join(BRANCH_JOIN)
        } else if current_or {
            expand(current, incoming)
        } else {
            expand(incoming, current)
        };

        if !is_usable_range(&generated) {
            return Err(ConstraintError::new(
                current,
                incoming,
                ConstraintFailure::InvalidExpansion { generated },
            ));
        }
        debug!(current, incoming, merged = %generated, "logical-or ranges expanded");
        return Ok(Resolution::new(generated, ResolutionMethod::Expanded));
    }

    let conjoined = conjoin(current, incoming);
    if is_usable_range(&conjoined) {
        debug!(current, incoming, merged = %conjoined, "ranges conjoined");
        return Ok(Resolution::new(conjoined, ResolutionMethod::Conjoined));
    }

    Err(ConstraintError::new(current, incoming, ConstraintFailure::Contradiction))
}

/// Intersect each branch of `disjunction` with `other`
///
/// A branch that cannot be intersected cleanly falls back to a conjunction,
/// branch text first.
fn expand(disjunction: &str, other: &str) -> String {
    branches(disjunction)
        .map(|branch| intersect(branch, other).unwrap_or_else(|_| conjoin(branch, other)))
        .collect::<Vec<_>>()
        .join(BRANCH_JOIN)
}

fn branches(value: &str) -> impl Iterator<Item = &str> {
    value.split(LOGICAL_OR).map(str::trim)
}

fn conjoin(left: &str, right: &str) -> String {
    format!("{} {}", left.trim(), right.trim())
}

fn is_semver(value: &str) -> bool {
    is_valid_pin(value) || is_valid_range(value)
}

/// A generated range must parse and leave room for at least one version
fn is_usable_range(value: &str) -> bool {
    Range::parse(value).map_or(false, |range| range.is_satisfiable())
}
