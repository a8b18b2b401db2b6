//! # jdm-engine
//!
//! A graph execution engine and expression language for JSON Decision
//! Models (JDM): a directed acyclic graph of typed nodes — input, output,
//! decision table, expression, switch — connected by edges, evaluated
//! against an input context to produce an output context.
//!
//! ## Module structure
//!
//! ```text
//! lib        → public façade: evaluate / evaluate_doc
//!   ↓
//! graph      → topological scheduling, fan-in merge, switch routing
//!   ↓
//! nodes      → per-kind node evaluation
//!   ↓
//! table      → decision table interpreter
//!   ↓
//! model      → Document / Node / Edge and their typed content
//!   ↓
//! expr       → lexer, parser, predicate desugaring, evaluator
//!   ↓
//! value      → the dynamic Value type and dotted-path/merge helpers
//! ```
//!
//! Loading a document (`loader`), configuring a call (`options`), and
//! reading back a result (`options::EvaluationResult`, `trace`) sit
//! alongside this pipeline rather than inside it.

pub mod error;
pub mod expr;
pub mod graph;
pub mod loader;
pub mod model;
pub mod nodes;
pub mod options;
pub mod table;
pub mod trace;
pub mod value;

use std::sync::Arc;

pub use error::{EngineError, EngineResult};
pub use loader::{DocumentCache, Loader, StaticLoader};
pub use model::{Document, Edge, Node, NodeKind};
pub use options::{EvaluationOptions, EvaluationResult};
pub use trace::TraceEntry;
pub use value::Value;

/// Resolve `key` through `loader` and evaluate the resulting document
/// against `context` (§4.H).
pub fn evaluate<L: Loader>(
    loader: &DocumentCache<L>,
    key: &str,
    context: Value,
    options: &EvaluationOptions,
) -> EngineResult<EvaluationResult> {
    let document = loader.get(key)?;
    evaluate_doc(&document, context, options)
}

/// Evaluate an already-resolved document against `context` (§4.H).
pub fn evaluate_doc(
    document: &Document,
    context: Value,
    options: &EvaluationOptions,
) -> EngineResult<EvaluationResult> {
    graph::execute(document, context, options)
}

/// Convenience: evaluate a document held behind an `Arc`, as returned by a
/// [`Loader`].
pub fn evaluate_shared(
    document: &Arc<Document>,
    context: Value,
    options: &EvaluationOptions,
) -> EngineResult<EvaluationResult> {
    evaluate_doc(document.as_ref(), context, options)
}
