//! Tree-walking evaluator for the expression AST (§4.C).

use crate::error::{EngineError, EngineResult};
use crate::value::{get_path, Value};

use super::ast::{BinaryOp, Expr, UnaryOp};

/// Evaluate `ast` against `env` (the current context), with `$` bound to
/// `pinned` when a decision-table or switch predicate supplied one.
pub fn eval(ast: &Expr, env: &Value, pinned: Option<&Value>) -> EngineResult<Value> {
    match ast {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::String(s) => Ok(Value::String(s.clone())),

        Expr::Ident(name) => {
            if name == "$" {
                return Ok(pinned.cloned().unwrap_or(Value::Null));
            }
            // Soft lookup: unknown identifiers resolve to null, not an error.
            Ok(get_path(env, name))
        }

        Expr::Member { target, field } => {
            let base = eval(target, env, pinned)?;
            Ok(get_path(&base, field))
        }

        Expr::Index { target, index } => {
            let base = eval(target, env, pinned)?;
            let idx = eval(index, env, pinned)?;
            eval_index(&base, &idx)
        }

        Expr::Unary { op, operand } => {
            let value = eval(operand, env, pinned)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOp::Neg => {
                    let n = expect_number(&value)?;
                    Ok(Value::Number(-n))
                }
            }
        }

        Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, env, pinned),

        Expr::In { lhs, rhs } => {
            let needle = eval(lhs, env, pinned)?;
            eval_in(&needle, rhs, env, pinned)
        }

        Expr::Range { .. } => Err(EngineError::TypeMismatch(
            "a range literal cannot be evaluated on its own; use it with 'in'".to_string(),
        )),
    }
}

fn eval_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    env: &Value,
    pinned: Option<&Value>,
) -> EngineResult<Value> {
    // Short-circuit logical operators: the result is the last evaluated
    // operand, not coerced to boolean (§4.C).
    match op {
        BinaryOp::And => {
            let l = eval(lhs, env, pinned)?;
            if !l.is_truthy() {
                return Ok(l);
            }
            return eval(rhs, env, pinned);
        }
        BinaryOp::Or => {
            let l = eval(lhs, env, pinned)?;
            if l.is_truthy() {
                return Ok(l);
            }
            return eval(rhs, env, pinned);
        }
        _ => {}
    }

    let l = eval(lhs, env, pinned)?;
    let r = eval(rhs, env, pinned)?;

    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let a = expect_number(&l)?;
            let b = expect_number(&r)?;
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => {
                    if b == 0.0 {
                        return Err(EngineError::DivisionByZero);
                    }
                    a / b
                }
                BinaryOp::Rem => {
                    if b == 0.0 {
                        return Err(EngineError::DivisionByZero);
                    }
                    a % b
                }
                _ => unreachable!(),
            };
            Ok(Value::Number(result))
        }
        BinaryOp::Eq => Ok(Value::Bool(l == r)),
        BinaryOp::NotEq => Ok(Value::Bool(l != r)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = l.partial_cmp(&r).ok_or_else(|| {
                EngineError::TypeMismatch(format!(
                    "cannot compare {} and {}: both operands must be numbers or both strings",
                    l.type_name(),
                    r.type_name()
                ))
            })?;
            use std::cmp::Ordering::*;
            let result = match op {
                BinaryOp::Lt => ordering == Less,
                BinaryOp::LtEq => ordering != Greater,
                BinaryOp::Gt => ordering == Greater,
                BinaryOp::GtEq => ordering != Less,
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("handled via short-circuit above"),
    }
}

fn eval_in(needle: &Value, range_expr: &Expr, env: &Value, pinned: Option<&Value>) -> EngineResult<Value> {
    if let Expr::Range {
        lo,
        lo_inclusive,
        hi,
        hi_inclusive,
    } = range_expr
    {
        let lo_val = expect_number(&eval(lo, env, pinned)?)?;
        let hi_val = expect_number(&eval(hi, env, pinned)?)?;
        let n = expect_number(needle)?;
        let above_lo = if *lo_inclusive { n >= lo_val } else { n > lo_val };
        let below_hi = if *hi_inclusive { n <= hi_val } else { n < hi_val };
        return Ok(Value::Bool(above_lo && below_hi));
    }

    let haystack = eval(range_expr, env, pinned)?;
    match &haystack {
        Value::Array(items) => Ok(Value::Bool(items.contains(needle))),
        other => Err(EngineError::TypeMismatch(format!(
            "right-hand side of 'in' must be a range or an array, found {}",
            other.type_name()
        ))),
    }
}

fn eval_index(base: &Value, index: &Value) -> EngineResult<Value> {
    match (base, index) {
        (Value::Array(items), Value::Number(n)) => {
            if *n < 0.0 {
                return Ok(Value::Null);
            }
            Ok(items.get(*n as usize).cloned().unwrap_or(Value::Null))
        }
        (Value::Object(_), Value::String(key)) => Ok(get_path(base, key)),
        (Value::Null, _) => Ok(Value::Null),
        _ => Err(EngineError::TypeMismatch(format!(
            "cannot index a {} with a {}",
            base.type_name(),
            index.type_name()
        ))),
    }
}

fn expect_number(value: &Value) -> EngineResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| EngineError::TypeMismatch(format!("expected a number, found {}", value.type_name())))
}
