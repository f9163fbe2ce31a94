//! Math functions.
//!
//! Functions: abs, mod, min, max, floor, ceiling, round, roundnearest, sqrt,
//!            ln, log10, sin, cos, tan, arcsin, arccos, arctan, arctan2
//!
//! Angles are in degrees. Integer arguments stay integers where the result
//! is exact (`abs`, `mod`, `min`, `max`); everything else is a double.

use super::pop_number;
use crate::values::Value;
use crate::vm::{Cpu, ExecutionError, FunctionManager};

// ============================================================================
// Basic Operations
// ============================================================================

/// Absolute value
fn math_abs(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = match cpu.pop_value()? {
        Value::Int(i) => Value::Int(i.wrapping_abs()),
        other => Value::Float(number(&other, "abs")?.abs()),
    };
    cpu.push(value)
}

/// Remainder with the sign of the dividend
fn math_mod(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let divisor = cpu.pop_value()?;
    let dividend = cpu.pop_value()?;
    let value = match (&dividend, &divisor) {
        (Value::Int(_), Value::Int(0)) => {
            return Err(ExecutionError::runtime("mod: division by zero"));
        }
        (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_rem(*b)),
        _ => Value::Float(number(&dividend, "mod")? % number(&divisor, "mod")?),
    };
    cpu.push(value)
}

fn math_min(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let b = cpu.pop_value()?;
    let a = cpu.pop_value()?;
    let value = match (&a, &b) {
        (Value::Int(a), Value::Int(b)) => Value::Int(*a.min(b)),
        _ => Value::Float(number(&a, "min")?.min(number(&b, "min")?)),
    };
    cpu.push(value)
}

fn math_max(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let b = cpu.pop_value()?;
    let a = cpu.pop_value()?;
    let value = match (&a, &b) {
        (Value::Int(a), Value::Int(b)) => Value::Int(*a.max(b)),
        _ => Value::Float(number(&a, "max")?.max(number(&b, "max")?)),
    };
    cpu.push(value)
}

// ============================================================================
// Rounding
// ============================================================================

fn math_floor(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = pop_number(cpu, "floor")?;
    cpu.push(Value::Float(value.floor()))
}

fn math_ceiling(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = pop_number(cpu, "ceiling")?;
    cpu.push(Value::Float(value.ceil()))
}

/// Round to the nearest integer, halves away from zero
fn math_round_nearest(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = pop_number(cpu, "roundnearest")?;
    cpu.push(Value::Float(value.round()))
}

/// Round to a number of decimal places
fn math_round(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let digits = pop_number(cpu, "round")?;
    let value = pop_number(cpu, "round")?;
    let scale = 10f64.powi(digits.clamp(0.0, 15.0) as i32);
    cpu.push(Value::Float((value * scale).round() / scale))
}

// ============================================================================
// Powers and Logarithms
// ============================================================================

fn math_sqrt(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = pop_number(cpu, "sqrt")?;
    cpu.push(Value::Float(value.sqrt()))
}

fn math_ln(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = pop_number(cpu, "ln")?;
    cpu.push(Value::Float(value.ln()))
}

fn math_log10(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = pop_number(cpu, "log10")?;
    cpu.push(Value::Float(value.log10()))
}

// ============================================================================
// Trigonometry
// ============================================================================

fn math_sin(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let degrees = pop_number(cpu, "sin")?;
    cpu.push(Value::Float(degrees.to_radians().sin()))
}

fn math_cos(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let degrees = pop_number(cpu, "cos")?;
    cpu.push(Value::Float(degrees.to_radians().cos()))
}

fn math_tan(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let degrees = pop_number(cpu, "tan")?;
    cpu.push(Value::Float(degrees.to_radians().tan()))
}

fn math_arcsin(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = pop_number(cpu, "arcsin")?;
    cpu.push(Value::Float(value.asin().to_degrees()))
}

fn math_arccos(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = pop_number(cpu, "arccos")?;
    cpu.push(Value::Float(value.acos().to_degrees()))
}

fn math_arctan(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = pop_number(cpu, "arctan")?;
    cpu.push(Value::Float(value.atan().to_degrees()))
}

/// `arctan2(y, x)`
fn math_arctan2(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let x = pop_number(cpu, "arctan2")?;
    let y = pop_number(cpu, "arctan2")?;
    cpu.push(Value::Float(y.atan2(x).to_degrees()))
}

fn number(value: &Value, function: &str) -> Result<f64, ExecutionError> {
    value.as_f64().ok_or_else(|| {
        ExecutionError::runtime(format!(
            "{}() expects a number but got {}",
            function,
            value.type_name()
        ))
    })
}

pub fn register(functions: &mut FunctionManager) {
    functions.register("abs", math_abs);
    functions.register("mod", math_mod);
    functions.register("min", math_min);
    functions.register("max", math_max);
    functions.register("floor", math_floor);
    functions.register("ceiling", math_ceiling);
    functions.register("round", math_round);
    functions.register("roundnearest", math_round_nearest);
    functions.register("sqrt", math_sqrt);
    functions.register("ln", math_ln);
    functions.register("log10", math_log10);
    functions.register("sin", math_sin);
    functions.register("cos", math_cos);
    functions.register("tan", math_tan);
    functions.register("arcsin", math_arcsin);
    functions.register("arccos", math_arccos);
    functions.register("arctan", math_arctan);
    functions.register("arctan2", math_arctan2);
}
