//! Predicate shorthand desugaring for decision-table and switch cells (§4.B).
//!
//! A predicate cell is parsed with the same grammar as a full expression,
//! but admits shorthand forms that all eventually normalize to an ordinary
//! `Expr` evaluated with `$` bound to the cell's pinned value.

use crate::error::EngineResult;

use super::ast::{BinaryOp, Expr};
use super::parser::parse_expression;

/// Parse a decision-table/switch cell into a normalized predicate `Expr`.
pub fn parse_predicate(cell: &str) -> EngineResult<Expr> {
    let trimmed = cell.trim();

    if trimmed.is_empty() || trimmed == "-" {
        return Ok(Expr::Bool(true));
    }

    if let Some((op, rest)) = strip_leading_comparison(trimmed) {
        let rhs = parse_expression(rest)?;
        return Ok(Expr::Binary {
            op,
            lhs: Box::new(Expr::Ident("$".to_string())),
            rhs: Box::new(rhs),
        });
    }

    let ast = parse_expression(trimmed)?;
    Ok(normalize(ast))
}

/// If `text` begins with a comparison operator, returns the operator and the
/// remaining (right-hand) text. Longer operators are checked first so `<=`
/// is not mistaken for `<`.
fn strip_leading_comparison(text: &str) -> Option<(BinaryOp, &str)> {
    const OPERATORS: &[(&str, BinaryOp)] = &[
        ("==", BinaryOp::Eq),
        ("!=", BinaryOp::NotEq),
        ("<=", BinaryOp::LtEq),
        (">=", BinaryOp::GtEq),
        ("<", BinaryOp::Lt),
        (">", BinaryOp::Gt),
    ];
    for (token, op) in OPERATORS {
        if let Some(rest) = text.strip_prefix(token) {
            return Some((*op, rest));
        }
    }
    None
}

/// Wrap a bare-value expression as `$ == value`, leave anything that is
/// already a full predicate (comparison, logical, membership, or anything
/// mentioning `$`) untouched, and rewrite a top-level range into `$ in range`.
fn normalize(ast: Expr) -> Expr {
    if let Expr::Range { .. } = &ast {
        return Expr::In {
            lhs: Box::new(Expr::Ident("$".to_string())),
            rhs: Box::new(ast),
        };
    }

    if references_dollar(&ast) || is_already_predicate(&ast) {
        return ast;
    }

    Expr::Binary {
        op: BinaryOp::Eq,
        lhs: Box::new(Expr::Ident("$".to_string())),
        rhs: Box::new(ast),
    }
}

fn is_already_predicate(ast: &Expr) -> bool {
    matches!(
        ast,
        Expr::Binary {
            op: BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::And
                | BinaryOp::Or,
            ..
        } | Expr::In { .. }
    )
}

fn references_dollar(ast: &Expr) -> bool {
    match ast {
        Expr::Ident(name) => name == "$",
        Expr::Null | Expr::Bool(_) | Expr::Number(_) | Expr::String(_) => false,
        Expr::Member { target, .. } => references_dollar(target),
        Expr::Index { target, index } => references_dollar(target) || references_dollar(index),
        Expr::Unary { operand, .. } => references_dollar(operand),
        Expr::Binary { lhs, rhs, .. } | Expr::In { lhs, rhs } => {
            references_dollar(lhs) || references_dollar(rhs)
        }
        Expr::Range { lo, hi, .. } => references_dollar(lo) || references_dollar(hi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_dash_are_always_true() {
        assert_eq!(parse_predicate("").unwrap(), Expr::Bool(true));
        assert_eq!(parse_predicate("-").unwrap(), Expr::Bool(true));
    }

    #[test]
    fn bare_value_becomes_dollar_eq() {
        let ast = parse_predicate("5").unwrap();
        assert_eq!(
            ast,
            Expr::Binary {
                op: BinaryOp::Eq,
                lhs: Box::new(Expr::Ident("$".to_string())),
                rhs: Box::new(Expr::Number(5.0)),
            }
        );
    }

    #[test]
    fn leading_comparison_binds_dollar() {
        let ast = parse_predicate("< 18").unwrap();
        assert_eq!(
            ast,
            Expr::Binary {
                op: BinaryOp::Lt,
                lhs: Box::new(Expr::Ident("$".to_string())),
                rhs: Box::new(Expr::Number(18.0)),
            }
        );
    }

    #[test]
    fn range_becomes_dollar_in_range() {
        let ast = parse_predicate("[18..65]").unwrap();
        match ast {
            Expr::In { lhs, rhs } => {
                assert_eq!(*lhs, Expr::Ident("$".to_string()));
                assert!(matches!(*rhs, Expr::Range { .. }));
            }
            other => panic!("expected In, got {other:?}"),
        }
    }

    #[test]
    fn explicit_dollar_expression_is_untouched() {
        let ast = parse_predicate("$ > 0 && $ < 100").unwrap();
        assert!(matches!(
            ast,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }
}
