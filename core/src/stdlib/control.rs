//! Flight control and variable management built-ins.

use tracing::debug;

use crate::values::Value;
use crate::vm::{Cpu, ExecutionError, FunctionManager, Host, operators};

/// `toggleflybywire(channel, enabled)`, emitted by `lock` and `unlock` on
/// flight controls.
fn toggle_fly_by_wire(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    let enabled = cpu.pop_value()?;
    let enabled = operators::to_bool(&enabled)?;
    let channel = match cpu.pop_value()? {
        Value::Str(channel) => channel,
        other => {
            return Err(ExecutionError::runtime(format!(
                "toggleflybywire() expects a channel name but got {}",
                other.type_name()
            )));
        }
    };
    debug!(%channel, enabled, "fly-by-wire");
    cpu.toggle_fly_by_wire(&channel, enabled);
    Ok(())
}

/// `unset x.` removes one variable, `unset all.` (a null argument) every
/// user variable.
fn unset(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    match cpu.pop_raw()? {
        Value::Null => cpu.remove_all_variables(),
        Value::Identifier(name) | Value::Str(name) => {
            cpu.remove_variable(&name);
        }
        other => {
            return Err(ExecutionError::runtime(format!(
                "unset() expects a variable but got {}",
                other.type_name()
            )));
        }
    }
    Ok(())
}

fn stage(cpu: &mut Cpu) -> Result<(), ExecutionError> {
    cpu.host_mut().stage();
    Ok(())
}

pub fn register(functions: &mut FunctionManager) {
    functions.register("toggleflybywire", toggle_fly_by_wire);
    functions.register("unset", unset);
    functions.register("stage", stage);
}
