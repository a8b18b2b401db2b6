//! Graph execution (§4.F): topological scheduling, fan-in merge, switch
//! dead-branch elimination, tracing, and timeout enforcement.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use tracing::{debug, trace};

use crate::error::{EngineError, EngineResult};
use crate::model::{Document, NodeContent, NodeKind};
use crate::nodes;
use crate::options::{metric, EvaluationOptions, EvaluationResult};
use crate::trace::TraceEntry;
use crate::value::{merge_all, Value};

/// Compute a topological order over `document`'s nodes. Ties are broken by
/// node id, lexicographically, so the order (and therefore trace order) is
/// deterministic across runs (§4.F, §8 property 1).
fn topological_order(document: &Document) -> EngineResult<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = document.nodes.keys().map(|id| (id.as_str(), 0)).collect();
    for edge in &document.edges {
        *in_degree.entry(edge.target_id.as_str()).or_insert(0) += 1;
    }

    let mut ready: Vec<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    ready.sort_unstable();
    let mut queue: VecDeque<&str> = ready.into();

    let mut order = Vec::with_capacity(document.nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());

        let mut newly_ready = Vec::new();
        for edge in document.outgoing(id) {
            let degree = in_degree.get_mut(edge.target_id.as_str()).expect("edge target exists");
            *degree -= 1;
            if *degree == 0 {
                newly_ready.push(edge.target_id.as_str());
            }
        }
        newly_ready.sort_unstable();
        for id in newly_ready {
            queue.push_back(id);
        }
    }

    if order.len() != document.nodes.len() {
        return Err(EngineError::InvalidGraph(
            "graph contains a cycle".to_string(),
        ));
    }

    Ok(order)
}

/// Run `document` against `input`, honoring `options`.
pub fn execute(
    document: &Document,
    input: Value,
    options: &EvaluationOptions,
) -> EngineResult<EvaluationResult> {
    let order = topological_order(document)?;
    let rank: HashMap<&str, usize> = order.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();

    let started = Instant::now();
    let mut outputs: HashMap<String, Value> = HashMap::new();
    let mut pruned: HashSet<String> = HashSet::new();
    let mut trace: Option<Vec<TraceEntry>> = options.include_trace.then(Vec::new);
    let mut edges_traversed: u64 = 0;

    for node_id in &order {
        if pruned.contains(node_id) {
            trace!(node_id, "skipping node pruned by switch dead-branch elimination");
            continue;
        }

        let node = document
            .node(node_id)
            .expect("topological_order only yields ids present in the document");

        let merged_input = if node.kind == NodeKind::Input {
            input.clone()
        } else {
            // Fan-in order follows predecessor topological rank, not edge
            // declaration order, so merge results are independent of how a
            // loader happened to list edges (§4.F).
            let mut predecessors: Vec<&str> = document
                .incoming(node_id)
                .map(|edge| edge.source_id.as_str())
                .collect();
            predecessors.sort_unstable_by_key(|id| rank.get(id).copied().unwrap_or(usize::MAX));
            // A predecessor pruned by switch dead-branch elimination never
            // gets an entry in `outputs`; skip it rather than treat its
            // absence as a bug (§4.F). Only live edges count toward the
            // traversal metric.
            let incoming: Vec<&Value> = predecessors
                .iter()
                .filter_map(|id| outputs.get(*id))
                .collect();

            if !predecessors.is_empty() && incoming.is_empty() {
                // Every predecessor of this node was itself pruned, so this
                // node has no live path into it this evaluation either;
                // prune it too and let the pruning cascade downstream.
                trace!(node_id, "pruning node whose every predecessor was pruned");
                pruned.insert(node_id.clone());
                continue;
            }

            edges_traversed += incoming.len() as u64;
            merge_all(incoming)
        };

        let node_started = Instant::now();
        let output = nodes::evaluate(node, &merged_input)?;
        let elapsed = node_started.elapsed();

        debug!(
            node_id = node.id.as_str(),
            kind = %node.kind,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "node executed"
        );

        if node.kind == NodeKind::Switch {
            let content = match &node.content {
                Some(NodeContent::Switch(content)) => content,
                _ => {
                    return Err(EngineError::InvalidGraph(format!(
                        "switch node '{}' is missing its content",
                        node.id
                    )))
                }
            };
            let matched = nodes::switch_matches(content, &merged_input)?;
            prune_unmatched_successors(document, node_id, &matched, &mut pruned)?;
        }

        if let Some(entries) = trace.as_mut() {
            entries.push(TraceEntry {
                id: node.id.clone(),
                name: node.name.clone(),
                kind: node.kind,
                input: merged_input,
                output: output.clone(),
                execution_time_ms: elapsed.as_secs_f64() * 1000.0,
            });
        }

        outputs.insert(node_id.clone(), output);

        if let Some(limit_ms) = options.max_execution_time_ms {
            if started.elapsed().as_millis() as u64 > limit_ms {
                return Err(EngineError::Timeout);
            }
        }
    }

    let output_node = document
        .nodes
        .values()
        .find(|n| n.kind == NodeKind::Output)
        .expect("Document::new requires at least one output node");

    let result = outputs
        .get(&output_node.id)
        .cloned()
        .unwrap_or(Value::Null);

    let performance = options.include_performance.then(|| {
        let mut metrics = HashMap::new();
        metrics.insert(
            metric::EXECUTION_TIME_MS.to_string(),
            started.elapsed().as_secs_f64() * 1000.0,
        );
        metrics.insert(metric::NODE_COUNT.to_string(), document.nodes.len() as f64);
        metrics.insert(metric::EDGES_TRAVERSED.to_string(), edges_traversed as f64);
        metrics
    });

    Ok(EvaluationResult {
        result,
        trace,
        performance,
    })
}

/// Every outbound edge of a switch node must carry a `source_handle` naming
/// the statement it's routed under; an edge with none means the loader
/// never populated switch routing metadata, which is a malformed graph, not
/// something to silently broadcast to (§9).
///
/// This only prunes the switch's immediate targets; it does not need to walk
/// further downstream itself, because `execute`'s own fan-in computation
/// re-derives "all of my predecessors were pruned" at each node it visits
/// and extends `pruned` accordingly, which is what carries a dead branch
/// through any number of intermediate nodes before it reconverges.
fn prune_unmatched_successors(
    document: &Document,
    switch_node_id: &str,
    matched_statement_ids: &[String],
    pruned: &mut HashSet<String>,
) -> EngineResult<()> {
    for edge in document.outgoing(switch_node_id) {
        let handle = edge.source_handle.as_deref().ok_or_else(|| {
            EngineError::InvalidGraph(format!(
                "switch node '{switch_node_id}' has an outgoing edge '{}' with no source handle",
                edge.id
            ))
        })?;

        if !matched_statement_ids.iter().any(|id| id == handle) {
            trace!(
                switch_node_id,
                edge_id = edge.id.as_str(),
                handle,
                "pruning switch branch"
            );
            pruned.insert(edge.target_id.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{parse_expression, parse_predicate};
    use crate::model::{Document, Edge, ExpressionContent, HitPolicy, Node, Statement, SwitchContent};
    use indexmap::{indexmap, IndexMap};

    fn expr_node(id: &str, path: &str, expr: &str) -> Node {
        Node {
            id: id.to_string(),
            name: id.to_string(),
            kind: NodeKind::Expression,
            content: Some(NodeContent::Expression(ExpressionContent {
                expressions: vec![(path.to_string(), parse_expression(expr).unwrap())],
            })),
        }
    }

    fn io_node(id: &str, kind: NodeKind) -> Node {
        Node {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            content: None,
        }
    }

    #[test]
    fn identity_and_multiply_pipeline() {
        let mut nodes = IndexMap::new();
        nodes.insert("in".to_string(), io_node("in", NodeKind::Input));
        nodes.insert("expr".to_string(), expr_node("expr", "result", "input * 2"));
        nodes.insert("out".to_string(), io_node("out", NodeKind::Output));
        let edges = vec![
            Edge {
                id: "e1".into(),
                source_id: "in".into(),
                target_id: "expr".into(),
                source_handle: None,
            },
            Edge {
                id: "e2".into(),
                source_id: "expr".into(),
                target_id: "out".into(),
                source_handle: None,
            },
        ];
        let document = Document::new("doc", "Doc", nodes, edges).unwrap();
        let input = Value::Object(indexmap! { "input".to_string() => Value::Number(15.0) });

        let result = execute(&document, input, &EvaluationOptions::default()).unwrap();
        assert_eq!(
            result.result,
            Value::Object(indexmap! { "input".to_string() => Value::Number(15.0), "result".to_string() => Value::Number(30.0) })
        );
    }

    #[test]
    fn cycle_is_rejected() {
        let mut nodes = IndexMap::new();
        nodes.insert("in".to_string(), io_node("in", NodeKind::Input));
        nodes.insert("a".to_string(), expr_node("a", "x", "1"));
        nodes.insert("b".to_string(), expr_node("b", "y", "1"));
        nodes.insert("out".to_string(), io_node("out", NodeKind::Output));
        let edges = vec![
            Edge { id: "e1".into(), source_id: "in".into(), target_id: "a".into(), source_handle: None },
            Edge { id: "e2".into(), source_id: "a".into(), target_id: "b".into(), source_handle: None },
            Edge { id: "e3".into(), source_id: "b".into(), target_id: "a".into(), source_handle: None },
            Edge { id: "e4".into(), source_id: "a".into(), target_id: "out".into(), source_handle: None },
        ];
        let document = Document::new("doc", "Doc", nodes, edges).unwrap();
        let err = execute(&document, Value::object(), &EvaluationOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidGraph(_)));
    }

    #[test]
    fn nested_assignment_creates_intermediate_objects() {
        let mut nodes = IndexMap::new();
        nodes.insert("in".to_string(), io_node("in", NodeKind::Input));
        nodes.insert("expr".to_string(), expr_node("expr", "a.b.c", "1 + 2"));
        nodes.insert("out".to_string(), io_node("out", NodeKind::Output));
        let edges = vec![
            Edge { id: "e1".into(), source_id: "in".into(), target_id: "expr".into(), source_handle: None },
            Edge { id: "e2".into(), source_id: "expr".into(), target_id: "out".into(), source_handle: None },
        ];
        let document = Document::new("doc", "Doc", nodes, edges).unwrap();
        let result = execute(&document, Value::object(), &EvaluationOptions::default()).unwrap();
        assert_eq!(crate::value::get_path(&result.result, "a.b.c"), Value::Number(3.0));
    }

    /// A dead branch two nodes deep (switch -> a -> b -> out, with `a`
    /// pruned) must not panic when `out`'s fan-in tries to merge `b`'s
    /// never-produced output, and `b` must itself be pruned rather than
    /// executed against an empty merge (§4.F transitive pruning).
    #[test]
    fn pruning_propagates_through_a_chain_of_dead_nodes() {
        let switch_content = SwitchContent {
            hit_policy: HitPolicy::First,
            statements: vec![
                Statement { id: "A".into(), condition: parse_predicate("x > 0").unwrap(), default: false },
                Statement { id: "B".into(), condition: parse_predicate("").unwrap(), default: true },
            ],
        };

        let mut nodes = IndexMap::new();
        nodes.insert("in".to_string(), io_node("in", NodeKind::Input));
        nodes.insert(
            "switch".to_string(),
            Node {
                id: "switch".into(),
                name: "switch".into(),
                kind: NodeKind::Switch,
                content: Some(NodeContent::Switch(switch_content)),
            },
        );
        // Dead chain: reachable only via the "A" (positive) branch.
        nodes.insert("a".to_string(), expr_node("a", "label", "\"positive-a\""));
        nodes.insert("b".to_string(), expr_node("b", "label", "\"positive-b\""));
        // Live branch: "B" (default).
        nodes.insert("other".to_string(), expr_node("other", "label", "\"other\""));
        nodes.insert("out".to_string(), io_node("out", NodeKind::Output));

        let edges = vec![
            Edge { id: "e1".into(), source_id: "in".into(), target_id: "switch".into(), source_handle: None },
            Edge { id: "e2".into(), source_id: "switch".into(), target_id: "a".into(), source_handle: Some("A".into()) },
            Edge { id: "e3".into(), source_id: "switch".into(), target_id: "other".into(), source_handle: Some("B".into()) },
            Edge { id: "e4".into(), source_id: "a".into(), target_id: "b".into(), source_handle: None },
            Edge { id: "e5".into(), source_id: "b".into(), target_id: "out".into(), source_handle: None },
            Edge { id: "e6".into(), source_id: "other".into(), target_id: "out".into(), source_handle: None },
        ];
        let document = Document::new("doc", "Doc", nodes, edges).unwrap();

        let context = Value::Object(indexmap! { "x".to_string() => Value::Number(-1.0) });
        let result = execute(&document, context, &EvaluationOptions::default()).unwrap();
        assert_eq!(
            crate::value::get_path(&result.result, "label"),
            Value::String("other".into())
        );
    }
}
