//! Arithmetic, comparison and logic on runtime values.
//!
//! Integer pairs stay integers except for division and powers, which are
//! always doubles. Any string operand turns the operation into a string
//! operation: `+` concatenates, ordering compares lengths and equality
//! ignores case.

use core::cmp::Ordering;
use std::rc::Rc;

use ecow::{EcoString, eco_format};

use super::ExecutionError;
use crate::values::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    NotEqual,
}

impl BinaryOp {
    fn verb(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "subtract",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Divide => "divide",
            BinaryOp::Power => "raise",
            BinaryOp::Greater
            | BinaryOp::Less
            | BinaryOp::GreaterOrEqual
            | BinaryOp::LessOrEqual => "order",
            BinaryOp::Equal | BinaryOp::NotEqual => "compare",
        }
    }

    /// Comparison result from an ordering, for the ordering operators.
    fn holds(self, ordering: Ordering) -> Option<bool> {
        let result = match self {
            BinaryOp::Greater => ordering == Ordering::Greater,
            BinaryOp::Less => ordering == Ordering::Less,
            BinaryOp::GreaterOrEqual => ordering != Ordering::Less,
            BinaryOp::LessOrEqual => ordering != Ordering::Greater,
            BinaryOp::Equal => ordering == Ordering::Equal,
            BinaryOp::NotEqual => ordering != Ordering::Equal,
            _ => return None,
        };
        Some(result)
    }
}

/// Apply `op` to already resolved operands.
pub fn calculate(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExecutionError> {
    match (left, right) {
        (Value::Str(_), _) | (_, Value::Str(_)) => strings(op, left, right),
        (Value::Int(a), Value::Int(b)) => integers(op, *a, *b),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => doubles(op, a, b),
                _ => Err(mismatch(op, left, right)),
            }
        }
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinaryOp::Equal => Ok(Value::Bool(a == b)),
            BinaryOp::NotEqual => Ok(Value::Bool(a != b)),
            _ => Err(mismatch(op, left, right)),
        },
        (Value::Structure(a), Value::Structure(b)) => match op {
            BinaryOp::Equal => Ok(Value::Bool(Rc::ptr_eq(a, b))),
            BinaryOp::NotEqual => Ok(Value::Bool(!Rc::ptr_eq(a, b))),
            _ => Err(mismatch(op, left, right)),
        },
        _ => Err(mismatch(op, left, right)),
    }
}

fn integers(op: BinaryOp, a: i32, b: i32) -> Result<Value, ExecutionError> {
    let value = match op {
        BinaryOp::Add => Value::Int(a.wrapping_add(b)),
        BinaryOp::Subtract => Value::Int(a.wrapping_sub(b)),
        BinaryOp::Multiply => Value::Int(a.wrapping_mul(b)),
        BinaryOp::Divide => Value::Float(a as f64 / b as f64),
        BinaryOp::Power => Value::Float((a as f64).powf(b as f64)),
        _ => return Ok(compare(op, a.cmp(&b))),
    };
    Ok(value)
}

fn doubles(op: BinaryOp, a: f64, b: f64) -> Result<Value, ExecutionError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        BinaryOp::Power => a.powf(b),
        _ => {
            // NaN compares unequal to everything and is not ordered.
            return Ok(match a.partial_cmp(&b) {
                Some(ordering) => compare(op, ordering),
                None => Value::Bool(op == BinaryOp::NotEqual),
            });
        }
    };
    Ok(Value::Float(value))
}

fn strings(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExecutionError> {
    let (a, b) = (text_of(left), text_of(right));
    match op {
        BinaryOp::Add => Ok(Value::Str(eco_format!("{}{}", a, b))),
        BinaryOp::Equal => Ok(Value::Bool(a.to_lowercase() == b.to_lowercase())),
        BinaryOp::NotEqual => Ok(Value::Bool(a.to_lowercase() != b.to_lowercase())),
        BinaryOp::Greater | BinaryOp::Less | BinaryOp::GreaterOrEqual | BinaryOp::LessOrEqual => {
            let ordering = a.chars().count().cmp(&b.chars().count());
            Ok(compare(op, ordering))
        }
        _ => Err(mismatch(op, left, right)),
    }
}

fn compare(op: BinaryOp, ordering: Ordering) -> Value {
    Value::Bool(op.holds(ordering).unwrap_or(false))
}

fn text_of(value: &Value) -> EcoString {
    match value {
        Value::Str(s) => s.clone(),
        other => eco_format!("{}", other),
    }
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> ExecutionError {
    ExecutionError::TypeMismatch {
        operation: op.verb(),
        left: EcoString::from(left.type_name()),
        right: EcoString::from(right.type_name()),
    }
}

/// `LogicNot`: booleans are inverted; numbers become 0 or 1 by truthiness
/// and keep their type.
pub fn logic_not(value: &Value) -> Result<Value, ExecutionError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        Value::Int(i) => Ok(Value::Int(if *i != 0 { 0 } else { 1 })),
        Value::Float(f) => Ok(Value::Float(if *f != 0.0 { 0.0 } else { 1.0 })),
        other => to_bool(other).map(|b| Value::Bool(!b)),
    }
}

pub fn to_bool(value: &Value) -> Result<bool, ExecutionError> {
    value
        .to_bool()
        .ok_or_else(|| ExecutionError::NotBoolean(EcoString::from(value.type_name())))
}

pub fn logic_and(left: &Value, right: &Value) -> Result<Value, ExecutionError> {
    Ok(Value::Bool(to_bool(left)? && to_bool(right)?))
}

pub fn logic_or(left: &Value, right: &Value) -> Result<Value, ExecutionError> {
    let (a, b) = (to_bool(left)?, to_bool(right)?);
    Ok(Value::Bool(a || b))
}
