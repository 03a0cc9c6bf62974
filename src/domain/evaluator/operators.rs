//! Binary and unary operator semantics.
//!
//! - `+` concatenates when either side is a string (`na` renders as "na").
//! - Arithmetic with an `na` operand is `na`; division or modulo by zero is `na`.
//! - Relational and equality comparisons with an `na` operand are `na`.
//! - Equality is structural for strings, bools, colors, points and records.
//! - Bools are not numbers in arithmetic: `true + 1` is an invalid operand.

use std::cmp::Ordering;

use crate::domain::ast::{BinaryOp, UnaryOp};
use crate::domain::error::EvalError;
use crate::domain::value::Value;
use super::text;

fn invalid(op: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::InvalidOperand {
        op: op.to_string(),
        left: left.type_name().to_string(),
        right: right.type_name().to_string(),
    }
}

/// Apply a non-short-circuiting binary operator. `and`/`or` are accepted too
/// and treat `na` as false.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, left, right)
        }
        BinaryOp::Eq => Ok(equality(left, right)),
        BinaryOp::Ne => Ok(match equality(left, right) {
            Value::Bool(b) => Value::Bool(!b),
            other => other,
        }),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => compare(op, left, right),
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match operand {
            Value::Na => Ok(Value::Na),
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(EvalError::InvalidOperand {
                op: "-".to_string(),
                left: other.type_name().to_string(),
                right: "nothing".to_string(),
            }),
        },
    }
}

fn add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Str(a), b) => text::bounded(format!("{a}{b}")),
        (a, Value::Str(b)) => text::bounded(format!("{a}{b}")),
        _ => arithmetic(BinaryOp::Add, left, right),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (a, b) = match (left, right) {
        (Value::Number(a), Value::Number(b)) => (*a, *b),
        (Value::Na, Value::Number(_) | Value::Na) | (Value::Number(_), Value::Na) => {
            return Ok(Value::Na);
        }
        _ => return Err(invalid(op.symbol(), left, right)),
    };
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b == 0.0 => return Ok(Value::Na),
        BinaryOp::Div => a / b,
        BinaryOp::Mod if b == 0.0 => return Ok(Value::Na),
        BinaryOp::Mod => a % b,
        _ => return Err(invalid(op.symbol(), left, right)),
    };
    Ok(Value::from_f64(result))
}

fn equality(left: &Value, right: &Value) -> Value {
    if left.is_na() || right.is_na() {
        return Value::Na;
    }
    Value::Bool(left == right)
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let ordering = match (left, right) {
        (Value::Na, _) | (_, Value::Na) => return Ok(Value::Na),
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => return Err(invalid(op.symbol(), left, right)),
    };
    let Some(ordering) = ordering else {
        return Ok(Value::Na);
    };
    let result = match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    };
    Ok(Value::Bool(result))
}
