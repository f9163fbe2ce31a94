//! Kerbo Standard Library
//!
//! Built-in functions the compiler calls by literal name:
//! - Terminal: print, printat, clearscreen
//! - Math: trigonometry in degrees, rounding, logarithms
//! - Control: toggleflybywire, unset, stage
//!
//! File and volume commands (`run`, `copy`, `list`, ...) depend on the
//! host's storage and are not registered here; a host that supports them
//! registers its own functions under those names.

use crate::vm::{Cpu, ExecutionError, FunctionManager};

pub mod control;
pub mod math;
pub mod terminal;


/// Register every default built-in.
///
/// [`Cpu::new`] calls this; use it directly when building a custom
/// registry.
pub fn register_defaults(functions: &mut FunctionManager) {
    terminal::register(functions);
    math::register(functions);
    control::register(functions);
}

/// Pop an argument that must be a number.
pub(crate) fn pop_number(cpu: &mut Cpu, function: &str) -> Result<f64, ExecutionError> {
    let value = cpu.pop_value()?;
    value.as_f64().ok_or_else(|| {
        ExecutionError::runtime(format!(
            "{}() expects a number but got {}",
            function,
            value.type_name()
        ))
    })
}
