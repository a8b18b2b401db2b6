//! Decision table interpreter (§4.D).

use tracing::trace;

use crate::error::EngineResult;
use crate::expr::eval;
use crate::model::{DecisionTableContent, HitPolicy};
use crate::value::{get_path, set_path, Value};

/// Run a decision table against `context`, producing its output value.
///
/// Under [`HitPolicy::First`] the result is the output object of the first
/// matching rule, or an empty object if none match. Under
/// [`HitPolicy::Collect`] the result is an array of every matching rule's
/// output object — a single array-valued result, not one branch per match
/// (§9).
pub fn run(table: &DecisionTableContent, context: &Value) -> EngineResult<Value> {
    // §4.D step 1: precompute each input column's bound value once, since
    // every rule's predicate for that column pins the same `$`.
    let column_values: Vec<Value> = table
        .inputs
        .iter()
        .map(|col| match &col.field {
            Some(field) => get_path(context, field),
            None => context.clone(),
        })
        .collect();

    let mut collected = Vec::new();

    for (rule_index, rule) in table.rules.iter().enumerate() {
        // A predicate that fails to evaluate (`TypeMismatch`,
        // `DivisionByZero`) must abort the whole node, not be treated as a
        // non-match (§7) — so propagate with `?` rather than swallowing it.
        let mut matched = true;
        for (predicate, pinned) in rule.inputs.iter().zip(column_values.iter()) {
            if !eval(predicate, context, Some(pinned))?.is_truthy() {
                matched = false;
                break;
            }
        }

        trace!(rule_index, matched, "decision table rule evaluated");

        if !matched {
            continue;
        }

        let mut output = Value::object();
        for (col, expr) in table.outputs.iter().zip(rule.outputs.iter()) {
            let value = eval(expr, context, None)?;
            set_path(&mut output, &col.field, value)
                .map_err(crate::error::EngineError::TypeMismatch)?;
        }

        match table.hit_policy {
            HitPolicy::First => return Ok(output),
            HitPolicy::Collect => collected.push(output),
        }
    }

    match table.hit_policy {
        HitPolicy::First => Ok(Value::object()),
        HitPolicy::Collect => Ok(Value::Array(collected)),
    }
}
