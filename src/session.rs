use kerbo_core::api::{CompilationOptions, CpuOptions};
use kerbo_core::compiler::Script;
use kerbo_core::linker::{LinkMode, Program, ProgramBuilder};
use kerbo_core::values::Value;
use kerbo_core::vm::{Cpu, Host, Instruction, Status};

use crate::Error;

/// Compile context used for files started with
/// [`Session::run_file_source`].
pub const PROGRAM_CONTEXT: &str = "program";

/// An interactive terminal: one compile driver feeding one CPU.
///
/// Lines given to [`execute`](Session::execute) are compiled into the shared
/// interpreter context and appended to the interpreter program, so variables,
/// locks and triggers carry over from line to line. Nothing runs until the
/// host calls [`update`](Session::update).
pub struct Session {
    script: Script,
    cpu: Cpu,
}

impl Session {
    pub fn new(options: CpuOptions, host: impl Host + 'static) -> Self {
        Self {
            script: Script::new(),
            cpu: Cpu::new(options, host),
        }
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Compile one interpreter entry and link it after the previous ones.
    pub fn execute(&mut self, source: &str) -> Result<(), Error> {
        let parts = self
            .script
            .compile(source, &CompilationOptions::default())
            .map_err(|error| Error::compile(source, error))?;
        self.cpu.link_interpreter_parts(parts)?;
        Ok(())
    }

    /// Compile a whole file into the `"program"` context and start it on
    /// top of the interpreter.
    pub fn run_file_source(&mut self, source: &str) -> Result<(), Error> {
        self.run_program(PROGRAM_CONTEXT, source, false)
    }

    /// Like [`run_file_source`](Session::run_file_source) with a compile
    /// context of its own.
    ///
    /// The context is cleared first, so every run starts from fresh labels,
    /// locks and triggers.
    pub fn run_program(
        &mut self,
        context_id: &str,
        source: &str,
        silent: bool,
    ) -> Result<(), Error> {
        let options = CompilationOptions {
            context_id: context_id.to_string(),
        };
        self.script.clear_context(context_id);
        let parts = self
            .script
            .compile(source, &options)
            .map_err(|error| Error::compile(source, error))?;
        let mut builder = ProgramBuilder::new(LinkMode::Program);
        builder.add_parts(parts);
        self.cpu.run_program(builder.build()?, silent);
        Ok(())
    }

    /// Advance the CPU by one tick of `delta` seconds.
    ///
    /// A returned error has already been contained and reported to the host;
    /// the session stays usable.
    pub fn update(&mut self, delta: f64) -> Result<(), Error> {
        self.cpu.update(delta)?;
        Ok(())
    }

    /// True when the mainline has nothing left to do: no program is
    /// running, nothing is waiting and the interpreter sits on its end
    /// marker. Armed interpreter triggers do not count.
    pub fn is_idle(&self) -> bool {
        if self.cpu.context_count() != 1 || self.cpu.status() != Status::Running {
            return false;
        }
        match self.cpu.interpreter() {
            Some(context) => matches!(
                context.program.get(context.instruction_pointer),
                Some(opcode) if opcode.instruction == Instruction::Eof
            ),
            None => true,
        }
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.cpu.variable(name).map(|variable| variable.value.clone())
    }

    /// Throw away every compiled line and start over with a fresh CPU state.
    pub fn reboot(&mut self) {
        self.script = Script::new();
        self.cpu.boot();
    }
}

/// Compile stand-alone source into a linked program, the way `run` and the
/// `compile` command need it.
pub fn compile_program(source: &str) -> Result<Program, Error> {
    let mut script = Script::new();
    let options = CompilationOptions {
        context_id: String::from(PROGRAM_CONTEXT),
    };
    let parts = script
        .compile(source, &options)
        .map_err(|error| Error::compile(source, error))?;
    let mut builder = ProgramBuilder::new(LinkMode::Program);
    builder.add_parts(parts);
    Ok(builder.build()?)
}
