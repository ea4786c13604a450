//! `intersect` and `classify`: the collision resolver on the command line

use manifold_core::{classify as classify_value, ConstraintKind, ManifoldError, ManifoldResult};
use manifold_resolver::resolve_detailed;
use serde::Serialize;

use super::CommandContext;

#[derive(Debug, Serialize)]
struct Classification<'a> {
    value: &'a str,
    kind: ConstraintKind,
}

/// Combine two constraints and print the result with the step that produced it
pub fn execute(current: &str, incoming: &str, json: bool, ctx: &CommandContext) -> ManifoldResult<()> {
    let resolution = resolve_detailed(current, incoming)?;

    if json {
        ctx.output.emit(&to_json(&resolution)?);
    } else {
        ctx.output.emit(&format!("{} ({})", resolution.value, resolution.method));
    }
    Ok(())
}

/// Print the kind of every value
pub fn classify(values: &[String], json: bool, ctx: &CommandContext) -> ManifoldResult<()> {
    let classifications: Vec<Classification<'_>> = values
        .iter()
        .map(|value| Classification {
            value,
            kind: classify_value(value),
        })
        .collect();

    if json {
        ctx.output.emit(&to_json(&classifications)?);
    } else {
        for classification in &classifications {
            ctx.output.emit(&format!("{}\t{}", classification.value, classification.kind));
        }
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> ManifoldResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ManifoldError::JsonParse {
        message: format!("JSON serialization error: {}", e),
    })
}
