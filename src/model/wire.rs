//! Wire-shaped (`serde`-derived) twins of the document model (§6).
//!
//! Deserializing a [`RawDocument`] gives back exactly the JSON shape a JDM
//! file is written in, with every cell still an unparsed string. Converting
//! it into a [`super::Document`] via [`TryFrom`] is where every expression
//! and predicate gets parsed once and cached as an AST; nothing downstream
//! of that conversion ever looks at a cell string again.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::content::{
    DecisionTableContent, ExpressionContent, NodeContent, RawDecisionTableContent,
    RawExpressionContent, RawSwitchContent, SwitchContent,
};
use super::{Document, Edge, Node, NodeKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub source_handle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    pub id: String,
    pub name: String,
    /// Keyed by node id, matching the wire shape in §6 — not a `Vec`, since
    /// a JDM document's `nodes` field is a JSON object, not an array.
    pub nodes: IndexMap<String, RawNode>,
    pub edges: Vec<RawEdge>,
}

impl TryFrom<RawNode> for Node {
    type Error = EngineError;

    fn try_from(raw: RawNode) -> EngineResult<Self> {
        let kind: NodeKind = raw.kind.parse()?;

        let content = match (kind, raw.content) {
            (NodeKind::Input | NodeKind::Output, _) => None,
            (NodeKind::Expression, Some(json)) => {
                let raw: RawExpressionContent = serde_json::from_value(json).map_err(|e| {
                    EngineError::InvalidGraph(format!(
                        "node '{}' has malformed expression content: {e}",
                        raw.id
                    ))
                })?;
                Some(NodeContent::Expression(ExpressionContent::try_from(raw)?))
            }
            (NodeKind::DecisionTable, Some(json)) => {
                let raw: RawDecisionTableContent = serde_json::from_value(json).map_err(|e| {
                    EngineError::InvalidGraph(format!(
                        "node '{}' has malformed decision table content: {e}",
                        raw.id
                    ))
                })?;
                Some(NodeContent::DecisionTable(DecisionTableContent::try_from(
                    raw,
                )?))
            }
            (NodeKind::Switch, Some(json)) => {
                let raw: RawSwitchContent = serde_json::from_value(json).map_err(|e| {
                    EngineError::InvalidGraph(format!(
                        "node '{}' has malformed switch content: {e}",
                        raw.id
                    ))
                })?;
                Some(NodeContent::Switch(SwitchContent::try_from(raw)?))
            }
            (kind, None) => {
                return Err(EngineError::InvalidGraph(format!(
                    "node '{}' of kind {kind} is missing its content payload",
                    raw.id
                )))
            }
        };

        Ok(Node {
            id: raw.id,
            name: raw.name,
            kind,
            content,
        })
    }
}

impl From<RawEdge> for Edge {
    fn from(raw: RawEdge) -> Self {
        Edge {
            id: raw.id,
            source_id: raw.source_id,
            target_id: raw.target_id,
            source_handle: raw.source_handle,
        }
    }
}

impl TryFrom<RawDocument> for Document {
    type Error = EngineError;

    fn try_from(raw: RawDocument) -> EngineResult<Self> {
        let mut nodes = IndexMap::with_capacity(raw.nodes.len());
        for (key, raw_node) in raw.nodes {
            if raw_node.id != key {
                return Err(EngineError::InvalidGraph(format!(
                    "node keyed '{key}' declares a mismatched id '{}'",
                    raw_node.id
                )));
            }
            let node = Node::try_from(raw_node)?;
            nodes.insert(node.id.clone(), node);
        }
        let edges = raw.edges.into_iter().map(Edge::from).collect();
        Document::new(raw.id, raw.name, nodes, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_document() {
        let json = serde_json::json!({
            "id": "doc1",
            "name": "Doc",
            "nodes": {
                "in": {"id": "in", "name": "Input", "type": "inputNode"},
                "expr": {"id": "expr", "name": "Double", "type": "expressionNode", "content": {
                    "expressions": {"result": "input * 2"}
                }},
                "out": {"id": "out", "name": "Output", "type": "outputNode"},
            },
            "edges": [
                {"id": "e1", "sourceId": "in", "targetId": "expr"},
                {"id": "e2", "sourceId": "expr", "targetId": "out"},
            ],
        });
        let raw: RawDocument = serde_json::from_value(json).unwrap();
        let doc = Document::try_from(raw).unwrap();
        assert_eq!(doc.nodes.len(), 3);
        assert!(matches!(doc.node("expr").unwrap().kind, NodeKind::Expression));
    }

    #[test]
    fn rejects_unknown_node_type() {
        let json = serde_json::json!({
            "id": "doc1",
            "name": "Doc",
            "nodes": {
                "in": {"id": "in", "name": "Input", "type": "inputNode"},
                "mystery": {"id": "mystery", "name": "?", "type": "mysteryNode"},
                "out": {"id": "out", "name": "Output", "type": "outputNode"},
            },
            "edges": [],
        });
        let raw: RawDocument = serde_json::from_value(json).unwrap();
        let err = Document::try_from(raw).unwrap_err();
        assert!(matches!(err, EngineError::UnknownNodeKind(_)));
    }

    #[test]
    fn mismatched_node_key_and_id_is_rejected() {
        let json = serde_json::json!({
            "id": "doc1",
            "name": "Doc",
            "nodes": {
                "in": {"id": "in", "name": "Input", "type": "inputNode"},
                "out": {"id": "mismatched", "name": "Output", "type": "outputNode"},
            },
            "edges": [],
        });
        let raw: RawDocument = serde_json::from_value(json).unwrap();
        let err = Document::try_from(raw).unwrap_err();
        assert!(matches!(err, EngineError::InvalidGraph(_)));
    }
}
