//! Per-kind node evaluation (§4.E).
//!
//! One function per node kind, dispatched by a single exhaustive match with
//! no dynamic dispatch and no allocation beyond what the kind itself needs.

use crate::error::{EngineError, EngineResult};
use crate::expr::eval;
use crate::model::{HitPolicy, Node, NodeContent, NodeKind, SwitchContent};
use crate::table;
use crate::value::{set_path, Value};

/// Evaluate `node`'s content against its merged inbound `context`, producing
/// the context it hands to its successors.
pub fn evaluate(node: &Node, context: &Value) -> EngineResult<Value> {
    let result = match (node.kind, &node.content) {
        (NodeKind::Input, _) => Ok(context.clone()),
        (NodeKind::Output, _) => Ok(context.clone()),
        (NodeKind::Expression, Some(NodeContent::Expression(content))) => {
            evaluate_expression(content, context)
        }
        (NodeKind::DecisionTable, Some(NodeContent::DecisionTable(content))) => {
            table::run(content, context)
        }
        (NodeKind::Switch, Some(NodeContent::Switch(_))) => {
            // A switch does not transform the context; routing is decided
            // by the graph executor, which needs the statement match set
            // to prune outbound edges (§4.F).
            Ok(context.clone())
        }
        (kind, _) => Err(EngineError::UnknownNodeKind(format!(
            "node '{}' declares kind {kind} with no matching content",
            node.id
        ))),
    };

    result.map_err(|e| e.into_node_failure(node.id.clone(), node.kind))
}

/// Which statement ids a switch node's conditions matched against
/// `context`, under its configured hit policy (§4.E, §4.F).
///
/// A `default: true` statement fires only when nothing else matched,
/// regardless of hit policy.
pub fn switch_matches(content: &SwitchContent, context: &Value) -> EngineResult<Vec<String>> {
    let mut matched = Vec::new();

    for statement in content.statements.iter().filter(|s| !s.default) {
        let hit = eval(&statement.condition, context, Some(context))?.is_truthy();
        if hit {
            matched.push(statement.id.clone());
            if content.hit_policy == HitPolicy::First {
                return Ok(matched);
            }
        }
    }

    if matched.is_empty() {
        if let Some(default_statement) = content.statements.iter().find(|s| s.default) {
            matched.push(default_statement.id.clone());
        }
    }

    Ok(matched)
}

fn evaluate_expression(
    content: &crate::model::ExpressionContent,
    context: &Value,
) -> EngineResult<Value> {
    let mut accumulator = context.clone();
    for (path, expr) in &content.expressions {
        let value = eval(expr, &accumulator, None)?;
        set_path(&mut accumulator, path, value).map_err(EngineError::TypeMismatch)?;
    }
    Ok(accumulator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse_expression;
    use crate::model::ExpressionContent;
    use indexmap::indexmap;

    fn node(kind: NodeKind, content: Option<NodeContent>) -> Node {
        Node {
            id: "n1".into(),
            name: "Node".into(),
            kind,
            content,
        }
    }

    #[test]
    fn expression_node_assigns_in_order() {
        let content = ExpressionContent {
            expressions: vec![
                ("a".to_string(), parse_expression("1").unwrap()),
                ("b".to_string(), parse_expression("a + 1").unwrap()),
            ],
        };
        let n = node(NodeKind::Expression, Some(NodeContent::Expression(content)));
        let out = evaluate(&n, &Value::object()).unwrap();
        assert_eq!(
            out,
            Value::Object(indexmap! {
                "a".to_string() => Value::Number(1.0),
                "b".to_string() => Value::Number(2.0),
            })
        );
    }

    #[test]
    fn input_and_output_pass_through() {
        let ctx = Value::Object(indexmap! { "x".to_string() => Value::Number(1.0) });
        assert_eq!(evaluate(&node(NodeKind::Input, None), &ctx).unwrap(), ctx);
        assert_eq!(evaluate(&node(NodeKind::Output, None), &ctx).unwrap(), ctx);
    }

    #[test]
    fn missing_content_errors_with_node_id() {
        let err = evaluate(&node(NodeKind::Expression, None), &Value::object()).unwrap_err();
        match err {
            EngineError::NodeExecutionFailure { node_id, .. } => assert_eq!(node_id, "n1"),
            other => panic!("expected NodeExecutionFailure, got {other:?}"),
        }
    }
}
