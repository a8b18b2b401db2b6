//! The JDM document model (§3, §6).
//!
//! `Document` is the engine's only input besides the evaluation context: a
//! directed graph of typed [`Node`]s joined by [`Edge`]s, with every
//! expression and predicate cell already parsed into an [`crate::expr::Expr`]
//! by the time a document exists. Constructing one eagerly performs that
//! parsing so a malformed cell is reported before any evaluation starts
//! (§9 design notes).

mod content;

pub use content::{
    DecisionRule, DecisionTableContent, ExpressionContent, HitPolicy, InputColumn, NodeContent,
    OutputColumn, Statement, SwitchContent,
};

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::{EngineError, EngineResult};

/// The five node kinds a JDM graph may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Input,
    Output,
    DecisionTable,
    Expression,
    Switch,
}

impl NodeKind {
    /// The wire tag this kind is spelled as in a document's `type` field
    /// (§6): `"inputNode"`, `"decisionTableNode"`, etc.
    pub fn wire_tag(self) -> &'static str {
        match self {
            NodeKind::Input => "inputNode",
            NodeKind::Output => "outputNode",
            NodeKind::DecisionTable => "decisionTableNode",
            NodeKind::Expression => "expressionNode",
            NodeKind::Switch => "switchNode",
        }
    }
}

impl FromStr for NodeKind {
    type Err = EngineError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "inputNode" => Ok(NodeKind::Input),
            "outputNode" => Ok(NodeKind::Output),
            "decisionTableNode" => Ok(NodeKind::DecisionTable),
            "expressionNode" => Ok(NodeKind::Expression),
            "switchNode" => Ok(NodeKind::Switch),
            other => Err(EngineError::UnknownNodeKind(other.to_string())),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Input => "input",
            NodeKind::Output => "output",
            NodeKind::DecisionTable => "decision_table",
            NodeKind::Expression => "expression",
            NodeKind::Switch => "switch",
        };
        write!(f, "{s}")
    }
}

/// A single node in the decision graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub content: Option<NodeContent>,
}

/// An edge joining two nodes. `source_handle` carries the switch-statement
/// id a switch's outbound edge is routed under (§4.F); it is `None` for
/// every other edge.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub source_handle: Option<String>,
}

/// A fully loaded, fully parsed JDM document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub nodes: IndexMap<String, Node>,
    pub edges: Vec<Edge>,
}

impl Document {
    /// Build a document from already-typed nodes and edges, validating the
    /// structural invariants of §3 that don't require a full topological
    /// pass (that part belongs to the graph executor, which needs to walk
    /// the graph anyway to detect cycles).
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        nodes: IndexMap<String, Node>,
        edges: Vec<Edge>,
    ) -> EngineResult<Self> {
        for edge in &edges {
            if !nodes.contains_key(&edge.source_id) {
                return Err(EngineError::InvalidGraph(format!(
                    "edge '{}' references unknown source node '{}'",
                    edge.id, edge.source_id
                )));
            }
            if !nodes.contains_key(&edge.target_id) {
                return Err(EngineError::InvalidGraph(format!(
                    "edge '{}' references unknown target node '{}'",
                    edge.id, edge.target_id
                )));
            }
        }

        if !nodes.values().any(|n| n.kind == NodeKind::Input) {
            return Err(EngineError::InvalidGraph(
                "document has no input node".to_string(),
            ));
        }
        if !nodes.values().any(|n| n.kind == NodeKind::Output) {
            return Err(EngineError::InvalidGraph(
                "document has no output node".to_string(),
            ));
        }

        Ok(Document {
            id: id.into(),
            name: name.into(),
            nodes,
            edges,
        })
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Outbound edges of `node_id`, in declaration order.
    pub fn outgoing(&self, node_id: &str) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.source_id == node_id)
    }

    /// Inbound edges of `node_id`, in declaration order.
    pub fn incoming(&self, node_id: &str) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.target_id == node_id)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for NodeKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.wire_tag())
    }
}

#[cfg(feature = "serde")]
mod wire;

#[cfg(feature = "serde")]
pub use wire::RawDocument;
