//! Binary operator implementations for the evaluator.
//!
//! Direct dispatch on the operand pair. Type checking has already
//! restricted the combinations that reach here; the remaining runtime
//! failures are integer overflow, division by zero and operands that only a
//! null check could catch.
//!
//! A null operand makes the result null: of type `bool` for comparisons and
//! regex matches, of the expression's inferred type otherwise.

use std::cmp::Ordering;
use std::mem;

use sluice_diagnostic::{Error, Result};
use sluice_ir::{BinaryOp, Duration, Regexp};
use sluice_types::{BasicType, MonoType};

use crate::value::Value;

#[cold]
fn integer_overflow(op: BinaryOp) -> Error {
    Error::invalid(format!("integer overflow evaluating {op}"))
}

#[cold]
fn type_mismatch(op: BinaryOp, left: &Value, right: &Value) -> Error {
    Error::type_mismatch(format!(
        "operator {op} is not supported for {} and {}",
        left.type_name(),
        right.type_name()
    ))
}

#[inline]
fn checked<T>(result: Option<T>, wrap: fn(T) -> Value, op: BinaryOp) -> Result<Value> {
    result.map(wrap).ok_or_else(|| integer_overflow(op))
}

fn compare(op: BinaryOp, ord: Option<Ordering>) -> Option<bool> {
    let b = match op {
        BinaryOp::Eq => ord == Some(Ordering::Equal),
        BinaryOp::NotEq => ord != Some(Ordering::Equal),
        BinaryOp::Lt => ord == Some(Ordering::Less),
        BinaryOp::LtEq => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Gt => ord == Some(Ordering::Greater),
        BinaryOp::GtEq => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        _ => return None,
    };
    Some(b)
}

/// Evaluate `left op right`; `ty` is the type inferred for the expression.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value, ty: &MonoType) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(if op.is_comparison() || op.is_regex() {
            Value::null(BasicType::Bool)
        } else {
            Value::Null(ty.clone())
        });
    }

    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int(op, *a, *b),
        (Value::UInt(a), Value::UInt(b)) => eval_uint(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => eval_float(op, *a, *b),
        (Value::String(a), Value::String(b)) => match op {
            BinaryOp::Add => Ok(Value::string(format!("{a}{b}"))),
            _ => compare(op, Some(a.cmp(b)))
                .map(Value::Bool)
                .ok_or_else(|| type_mismatch(op, left, right)),
        },
        (Value::Duration(a), Value::Duration(b)) => eval_duration(op, *a, *b),
        (Value::Time(a), Value::Time(b)) => compare(op, Some(a.cmp(b)))
            .map(Value::Bool)
            .ok_or_else(|| type_mismatch(op, left, right)),
        (Value::String(s), Value::Regexp(r)) if op.is_regex() => Ok(eval_regex(op, s, r)),
        _ if op.is_comparison() => {
            if let Some(ord) = mixed_numeric_cmp(left, right) {
                return compare(op, ord)
                    .map(Value::Bool)
                    .ok_or_else(|| type_mismatch(op, left, right));
            }
            let same_kind = mem::discriminant(left) == mem::discriminant(right);
            match op {
                BinaryOp::Eq if same_kind => Ok(Value::Bool(left == right)),
                BinaryOp::NotEq if same_kind => Ok(Value::Bool(left != right)),
                _ => Err(type_mismatch(op, left, right)),
            }
        }
        _ => Err(type_mismatch(op, left, right)),
    }
}

fn eval_int(op: BinaryOp, a: i64, b: i64) -> Result<Value> {
    match op {
        BinaryOp::Add => checked(a.checked_add(b), Value::Int, op),
        BinaryOp::Sub => checked(a.checked_sub(b), Value::Int, op),
        BinaryOp::Mul => checked(a.checked_mul(b), Value::Int, op),
        BinaryOp::Div if b == 0 => Err(Error::invalid("division by zero")),
        BinaryOp::Div => checked(a.checked_div(b), Value::Int, op),
        BinaryOp::Mod if b == 0 => Err(Error::invalid("modulo by zero")),
        BinaryOp::Mod => checked(a.checked_rem(b), Value::Int, op),
        BinaryOp::Pow => {
            let exp = u32::try_from(b)
                .map_err(|_| Error::invalid(format!("invalid integer exponent {b}")))?;
            checked(a.checked_pow(exp), Value::Int, op)
        }
        _ => compare(op, Some(a.cmp(&b)))
            .map(Value::Bool)
            .ok_or_else(|| type_mismatch(op, &Value::Int(a), &Value::Int(b))),
    }
}

fn eval_uint(op: BinaryOp, a: u64, b: u64) -> Result<Value> {
    match op {
        BinaryOp::Add => checked(a.checked_add(b), Value::UInt, op),
        BinaryOp::Sub => checked(a.checked_sub(b), Value::UInt, op),
        BinaryOp::Mul => checked(a.checked_mul(b), Value::UInt, op),
        BinaryOp::Div if b == 0 => Err(Error::invalid("division by zero")),
        BinaryOp::Div => checked(a.checked_div(b), Value::UInt, op),
        BinaryOp::Mod if b == 0 => Err(Error::invalid("modulo by zero")),
        BinaryOp::Mod => checked(a.checked_rem(b), Value::UInt, op),
        BinaryOp::Pow => {
            let exp = u32::try_from(b)
                .map_err(|_| Error::invalid(format!("invalid integer exponent {b}")))?;
            checked(a.checked_pow(exp), Value::UInt, op)
        }
        _ => compare(op, Some(a.cmp(&b)))
            .map(Value::Bool)
            .ok_or_else(|| type_mismatch(op, &Value::UInt(a), &Value::UInt(b))),
    }
}

fn eval_float(op: BinaryOp, a: f64, b: f64) -> Result<Value> {
    let v = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        BinaryOp::Pow => a.powf(b),
        _ => {
            return compare(op, a.partial_cmp(&b))
                .map(Value::Bool)
                .ok_or_else(|| type_mismatch(op, &Value::Float(a), &Value::Float(b)));
        }
    };
    Ok(Value::Float(v))
}

fn eval_duration(op: BinaryOp, a: Duration, b: Duration) -> Result<Value> {
    match op {
        BinaryOp::Add => a
            .checked_add(b)
            .map(Value::Duration)
            .ok_or_else(|| Error::invalid("duration overflow")),
        BinaryOp::Sub => a
            .checked_sub(b)
            .map(Value::Duration)
            .ok_or_else(|| Error::invalid("duration overflow")),
        _ => compare(op, Some(a.cmp(&b)))
            .map(Value::Bool)
            .ok_or_else(|| type_mismatch(op, &Value::Duration(a), &Value::Duration(b))),
    }
}

fn eval_regex(op: BinaryOp, s: &str, r: &Regexp) -> Value {
    let matched = r.is_match(s);
    Value::Bool(if op == BinaryOp::RegexMatch {
        matched
    } else {
        !matched
    })
}

/// Ordering between numbers of different kinds; `None` when the pair is
/// not a mixed numeric pair.
#[expect(
    clippy::cast_precision_loss,
    reason = "comparing an integer with a float is done in float space"
)]
fn mixed_numeric_cmp(left: &Value, right: &Value) -> Option<Option<Ordering>> {
    let ord = match (left, right) {
        (Value::Int(a), Value::UInt(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
        (Value::UInt(a), Value::Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::UInt(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::UInt(b)) => a.partial_cmp(&(*b as f64)),
        _ => return None,
    };
    Some(ord)
}
