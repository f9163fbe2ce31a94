//! Script files on disk.
//!
//! The CPU has no volumes of its own, so `run` is provided here: it looks
//! the program up next to the file the CLI was started with.

use std::path::{Path, PathBuf};

use kerbo::{Cpu, ExecutionError, Value, compile_program};
use tracing::debug;

/// Extension tried when a script is named without one.
pub const SCRIPT_EXTENSION: &str = "ks";

/// Resolve a script name the way `run` does: relative to `base`, with the
/// default extension added when the name has none.
pub fn resolve(base: &Path, name: &str) -> PathBuf {
    let mut path = base.join(name);
    if path.extension().is_none() {
        path.set_extension(SCRIPT_EXTENSION);
    }
    path
}

/// Register `run(name, volume)` on the CPU.
///
/// Call arguments stay on the stack for the program's own
/// `declare parameter`.
pub fn register_run(cpu: &mut Cpu, base: PathBuf) {
    cpu.functions_mut()
        .register("run", move |cpu: &mut Cpu| run(cpu, &base));
}

fn run(cpu: &mut Cpu, base: &Path) -> Result<(), ExecutionError> {
    let volume = cpu.pop_raw()?;
    if !volume.is_null() {
        debug!(%volume, "volumes are not supported, using the local directory");
    }
    let name = match cpu.pop_raw()? {
        Value::Str(name) | Value::Identifier(name) => name,
        Value::Int(number) => number.to_string().into(),
        other => {
            return Err(ExecutionError::runtime(format!(
                "run() expects a file name but got {}",
                other.type_name()
            )));
        }
    };

    let path = resolve(base, &name);
    let source = std::fs::read_to_string(&path)
        .map_err(|_| ExecutionError::runtime(format!("File '{}' not found", name)))?;
    let program = compile_program(&source).map_err(|e| ExecutionError::runtime(e.to_string()))?;
    debug!(path = %path.display(), opcodes = program.len(), "starting program");
    cpu.run_program(program, false);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_adds_extension() {
        let base = Path::new("scripts");
        assert_eq!(resolve(base, "launch"), base.join("launch.ks"));
        assert_eq!(resolve(base, "launch.txt"), base.join("launch.txt"));
    }
}
