//! The engine's error taxonomy.
//!
//! A single [`EngineError`] threads through lexing, parsing, table matching,
//! and graph execution. Every fallible operation in this crate returns
//! [`EngineResult<T>`].

use thiserror::Error;

use crate::model::NodeKind;

/// Convenience alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Everything that can go wrong while loading or evaluating a JDM document.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The loader could not resolve the requested key.
    #[error("no document found for key '{0}'")]
    NotFound(String),

    /// The graph itself is malformed: a cycle, a dangling edge, a missing
    /// input/output node, or a duplicate node id.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Lexing or parsing an expression/predicate cell failed.
    #[error("parse error at position {position}: {message}")]
    ParseError {
        /// Byte offset into the source string where parsing failed.
        position: u32,
        /// Human-readable description of the failure.
        message: String,
    },

    /// A runtime operand type error in the expression evaluator.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Arithmetic division (or modulo) by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A node's `type` tag was not recognized by this engine.
    #[error("unknown node kind: {0}")]
    UnknownNodeKind(String),

    /// `max_execution_time_ms` was exceeded.
    #[error("evaluation exceeded the configured timeout")]
    Timeout,

    /// Catch-all wrapper that annotates any of the above with the node that
    /// was executing when it happened.
    #[error("node '{node_id}' ({node_kind}) failed: {source}")]
    NodeExecutionFailure {
        /// Id of the node that failed.
        node_id: String,
        /// Kind of the node that failed.
        node_kind: NodeKind,
        /// The underlying cause.
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Wrap `self` in [`EngineError::NodeExecutionFailure`] unless it already
    /// is one (nesting the wrapper would hide the original node).
    pub fn into_node_failure(self, node_id: impl Into<String>, node_kind: NodeKind) -> Self {
        match self {
            EngineError::NodeExecutionFailure { .. } => self,
            other => EngineError::NodeExecutionFailure {
                node_id: node_id.into(),
                node_kind,
                source: Box::new(other),
            },
        }
    }
}
