//! Node-kind-specific content payloads (§3).
//!
//! Each kind has a *raw* wire-shaped twin (string cells, as they appear in a
//! JDM document) and a *parsed* form holding cached [`Expr`] ASTs. The raw
//! structs are the only ones that carry `serde` derives — by the time a
//! caller's loader hands us a [`super::Document`], every cell has already
//! been parsed once (§4.C, §9) and is never reparsed during evaluation.

use indexmap::IndexMap;

use crate::error::{EngineError, EngineResult};
use crate::expr::{parse_expression, parse_predicate, Expr};

/// Which matching rows of a decision table or switch contribute to the
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HitPolicy {
    First,
    Collect,
}

impl Default for HitPolicy {
    fn default() -> Self {
        HitPolicy::First
    }
}

// ---------------------------------------------------------------------
// Expression node
// ---------------------------------------------------------------------

/// Wire shape of an expression node's content: an ordered mapping from
/// dotted target path to expression source.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone)]
pub struct RawExpressionContent {
    pub expressions: IndexMap<String, String>,
}

/// Parsed form: each assignment's source has already been compiled to an
/// [`Expr`]. Order matches declaration order, which is significant (§4.E).
#[derive(Debug, Clone)]
pub struct ExpressionContent {
    pub expressions: Vec<(String, Expr)>,
}

impl TryFrom<RawExpressionContent> for ExpressionContent {
    type Error = EngineError;

    fn try_from(raw: RawExpressionContent) -> EngineResult<Self> {
        let expressions = raw
            .expressions
            .into_iter()
            .map(|(path, source)| parse_expression(&source).map(|ast| (path, ast)))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(ExpressionContent { expressions })
    }
}

// ---------------------------------------------------------------------
// Decision table node
// ---------------------------------------------------------------------

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone)]
pub struct InputColumn {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub field: Option<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone)]
pub struct OutputColumn {
    pub id: String,
    pub field: String,
}

/// Raw wire shape: `{"hitPolicy", "inputs", "outputs", "rules"}`, each rule
/// a mapping from column id to its (unparsed) cell string.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone)]
pub struct RawDecisionTableContent {
    #[cfg_attr(feature = "serde", serde(default))]
    pub hit_policy: HitPolicy,
    pub inputs: Vec<InputColumn>,
    pub outputs: Vec<OutputColumn>,
    pub rules: Vec<IndexMap<String, String>>,
}

/// One decision-table row with every cell already parsed, positionally
/// aligned with the table's `inputs`/`outputs` columns. A missing cell
/// desugars to `"-"` (always true / `Expr::Null` for an absent output),
/// exactly as an empty predicate string would (§4.B).
#[derive(Debug, Clone)]
pub struct DecisionRule {
    pub inputs: Vec<Expr>,
    pub outputs: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct DecisionTableContent {
    pub hit_policy: HitPolicy,
    pub inputs: Vec<InputColumn>,
    pub outputs: Vec<OutputColumn>,
    pub rules: Vec<DecisionRule>,
}

impl TryFrom<RawDecisionTableContent> for DecisionTableContent {
    type Error = EngineError;

    fn try_from(raw: RawDecisionTableContent) -> EngineResult<Self> {
        let rules = raw
            .rules
            .into_iter()
            .map(|cells| {
                let inputs = raw
                    .inputs
                    .iter()
                    .map(|col| {
                        let cell = cells.get(&col.id).map(String::as_str).unwrap_or("-");
                        parse_predicate(cell)
                    })
                    .collect::<EngineResult<Vec<_>>>()?;
                let outputs = raw
                    .outputs
                    .iter()
                    .map(|col| {
                        let cell = cells.get(&col.id).map(String::as_str).unwrap_or("null");
                        parse_expression(cell)
                    })
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(DecisionRule { inputs, outputs })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(DecisionTableContent {
            hit_policy: raw.hit_policy,
            inputs: raw.inputs,
            outputs: raw.outputs,
            rules,
        })
    }
}

// ---------------------------------------------------------------------
// Switch node
// ---------------------------------------------------------------------

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone)]
pub struct RawStatement {
    pub id: String,
    pub condition: String,
    #[cfg_attr(feature = "serde", serde(default, rename = "isDefault"))]
    pub default: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone)]
pub struct RawSwitchContent {
    #[cfg_attr(feature = "serde", serde(default))]
    pub hit_policy: HitPolicy,
    pub statements: Vec<RawStatement>,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub id: String,
    pub condition: Expr,
    pub default: bool,
}

#[derive(Debug, Clone)]
pub struct SwitchContent {
    pub hit_policy: HitPolicy,
    pub statements: Vec<Statement>,
}

impl TryFrom<RawSwitchContent> for SwitchContent {
    type Error = EngineError;

    fn try_from(raw: RawSwitchContent) -> EngineResult<Self> {
        let statements = raw
            .statements
            .into_iter()
            .map(|s| {
                parse_predicate(&s.condition).map(|condition| Statement {
                    id: s.id,
                    condition,
                    default: s.default,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(SwitchContent {
            hit_policy: raw.hit_policy,
            statements,
        })
    }
}

// ---------------------------------------------------------------------
// Node content, either shape
// ---------------------------------------------------------------------

/// The parsed, ready-to-evaluate payload of a non-input/output node.
#[derive(Debug, Clone)]
pub enum NodeContent {
    Expression(ExpressionContent),
    DecisionTable(DecisionTableContent),
    Switch(SwitchContent),
}
