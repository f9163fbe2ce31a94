//! Output built-ins. Everything goes through the [`Host`](crate::vm::Host).

use crate::vm::{Cpu, ExecutionError, FunctionManager, Host};

/// `print value.`
fn print(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let value = cpu.pop_value()?;
    cpu.host_mut().print(&value.to_string());
    Ok(())
}

/// `print value at (column, line).`
fn print_at(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let line = super::pop_number(cpu, "printat")?;
    let column = super::pop_number(cpu, "printat")?;
    let value = cpu.pop_value()?;
    cpu.host_mut()
        .print_at(&value.to_string(), column as i32, line as i32);
    Ok(())
}

fn clear_screen(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    cpu.host_mut().clear_screen();
    Ok(())
}

pub fn register(functions: &mut FunctionManager) {
    functions.register("print", print);
    functions.register("printat", print_at);
    functions.register("clearscreen", clear_screen);
}
