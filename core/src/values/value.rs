use core::fmt;
use std::rc::Rc;

use ecow::EcoString;
use serde::{Deserialize, Serialize};

use super::Structure;

/// A runtime value.
///
/// `Identifier` is a reference to a variable by name and is resolved by the
/// CPU when an opcode asks for a value. `Address` is a linked code address:
/// a trigger entry point or a lock function pointer.
#[derive(Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(EcoString),
    Identifier(EcoString),
    Address(usize),
    /// Host objects with suffixes. Never part of compiled code.
    #[serde(skip)]
    Structure(Rc<dyn Structure>),
}

impl Value {
    /// Variable reference, as written by the compiler (`$name`).
    pub fn identifier(name: &str) -> Self {
        Value::Identifier(EcoString::from(name.trim_start_matches('$')))
    }

    pub fn str(s: &str) -> Self {
        Value::Str(EcoString::from(s))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Int(_) => "Integer",
            Value::Float(_) => "Double",
            Value::Str(_) => "String",
            Value::Identifier(_) => "Identifier",
            Value::Address(_) => "Address",
            Value::Structure(s) => s.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Truthiness with the usual conversions: non-zero numbers are true and
    /// strings parse as `true`/`false`. `None` when there is no conversion.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::Str(s) => {
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Integer view of a number, truncating doubles.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i32),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<usize> {
        match self {
            Value::Address(a) => Some(*a),
            Value::Int(i) if *i >= 0 => Some(*i as usize),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

// Single precision never reaches the stack.
impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Identifier(a), Value::Identifier(b)) => a == b,
            (Value::Address(a), Value::Address(b)) => a == b,
            (Value::Structure(a), Value::Structure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn format_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "NaN")
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            write!(f, "Infinity")
        } else {
            write!(f, "-Infinity")
        }
    } else {
        write!(f, "{}", value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => format_float(f, *v),
            Value::Str(s) => write!(f, "{}", s),
            Value::Identifier(name) => write!(f, "${}", name),
            Value::Address(a) => write!(f, "@{:04}", a),
            Value::Structure(s) => write!(f, "{}", s.describe()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Structure(s) => write!(f, "<{}>", s.type_name()),
            other => fmt::Display::fmt(other, f),
        }
    }
}
