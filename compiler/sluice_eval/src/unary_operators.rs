//! Unary operator implementations for the evaluator.
//!
//! `not` and `exists` treat null as false; negation and unary plus
//! propagate it.

use sluice_diagnostic::{Error, Result};
use sluice_ir::UnaryOp;
use sluice_types::MonoType;

use crate::value::Value;

/// Evaluate `op value`; `ty` is the type inferred for the expression.
pub fn evaluate_unary(op: UnaryOp, value: &Value, ty: &MonoType) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Exists, v) => Ok(Value::Bool(!v.is_null())),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Not, Value::Null(_)) => Ok(Value::Bool(true)),
        (UnaryOp::Neg | UnaryOp::Pos, Value::Null(_)) => Ok(Value::Null(ty.clone())),

        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| Error::invalid("integer overflow evaluating -")),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, Value::Duration(d)) => d
            .checked_neg()
            .map(Value::Duration)
            .ok_or_else(|| Error::invalid("duration overflow")),

        (UnaryOp::Pos, Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Duration(_)) => {
            Ok(value.clone())
        }

        _ => Err(invalid_unary_op(op, value)),
    }
}

#[cold]
fn invalid_unary_op(op: UnaryOp, value: &Value) -> Error {
    Error::type_mismatch(format!(
        "operator {} is not supported for {}",
        op.as_symbol().trim_end(),
        value.type_name()
    ))
}
