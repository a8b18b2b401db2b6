//! Evaluation configuration and results (§4.H, §4.K, §6).

use std::collections::HashMap;

use crate::trace::TraceEntry;
use crate::value::Value;

/// The engine's entire load-time configuration surface, passed per call
/// rather than read from a config file or environment (§4.K).
#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    pub include_trace: bool,
    pub include_performance: bool,
    pub max_execution_time_ms: Option<u64>,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        EvaluationOptions {
            include_trace: false,
            include_performance: false,
            max_execution_time_ms: None,
        }
    }
}

impl EvaluationOptions {
    pub fn with_trace(mut self, include_trace: bool) -> Self {
        self.include_trace = include_trace;
        self
    }

    pub fn with_performance(mut self, include_performance: bool) -> Self {
        self.include_performance = include_performance;
        self
    }

    pub fn with_timeout(mut self, max_execution_time_ms: u64) -> Self {
        self.max_execution_time_ms = Some(max_execution_time_ms);
        self
    }
}

/// The result of one `evaluate`/`evaluate_doc` call.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub result: Value,
    pub trace: Option<Vec<TraceEntry>>,
    pub performance: Option<HashMap<String, f64>>,
}

/// Performance metric keys populated when `include_performance` is set
/// (§4.H): total wall time, node count, and edges traversed.
pub mod metric {
    pub const EXECUTION_TIME_MS: &str = "execution_time_ms";
    pub const NODE_COUNT: &str = "node_count";
    pub const EDGES_TRAVERSED: &str = "edges_traversed";
}
