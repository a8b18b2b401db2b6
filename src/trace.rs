//! Per-node execution trace entries (§4.F, §6).

use crate::model::NodeKind;
use crate::value::Value;

/// A snapshot of one node's execution, in visitation order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TraceEntry {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: NodeKind,
    pub input: Value,
    pub output: Value,
    pub execution_time_ms: f64,
}
