//! The tick-driven scheduler.

use ecow::EcoString;
use hashbrown::HashMap;
use tracing::{debug, error, warn};

use super::{ExecutionError, FunctionManager, Host, ProgramContext, Stack};
use crate::api::CpuOptions;
use crate::compiler::CodePart;
use crate::linker::{LinkError, Program};
use crate::stdlib;
use crate::values::{Value, Variable, is_pointer_name, variable_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    /// Mainline suspended. Triggers still run.
    Waiting,
}

/// Why a run of instructions stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    /// `Eof`: end of a trigger or of the interpreter's code so far.
    EndOfFunction,
    /// `Eop`, or no context left to run.
    EndOfProgram,
}

/// The virtual machine.
///
/// A `Cpu` owns a stack of [`ProgramContext`]s (the interpreter at the
/// bottom, running programs above it), the global variable table and the
/// built-in registry. It never runs on its own: the host calls
/// [`update`](Cpu::update) once per simulation tick and the CPU executes at
/// most `instructions_per_update` opcodes, triggers first.
///
/// # Example
///
/// ```
/// use kerbo_core::api::CpuOptions;
/// use kerbo_core::values::Value;
/// use kerbo_core::vm::{BufferHost, Cpu};
///
/// let mut cpu = Cpu::new(CpuOptions::default(), BufferHost::new());
/// cpu.set_value("answer", Value::Int(42));
/// assert_eq!(cpu.get_value(&Value::identifier("ANSWER")), Ok(Value::Int(42)));
/// ```
pub struct Cpu {
    pub(super) options: CpuOptions,
    pub(super) stack: Stack,
    variables: HashMap<EcoString, Variable>,
    status: Status,
    current_time: f64,
    wait_until: Option<f64>,
    pub(super) functions: FunctionManager,
    pub(super) contexts: Vec<ProgramContext>,
    pub(super) host: Box<dyn Host>,
}

impl Cpu {
    /// A booted CPU with the default built-ins registered.
    pub fn new(options: CpuOptions, host: impl Host + 'static) -> Self {
        let mut functions = FunctionManager::new();
        stdlib::register_defaults(&mut functions);
        let mut cpu = Self {
            stack: Stack::new(options.max_stack_depth, options.safe_mode),
            options,
            variables: HashMap::new(),
            status: Status::Running,
            current_time: 0.0,
            wait_until: None,
            functions,
            contexts: Vec::new(),
            host: Box::new(host),
        };
        cpu.boot();
        cpu
    }

    /// Reset to a fresh interpreter: no variables, no programs, time zero.
    pub fn boot(&mut self) {
        self.stack.clear();
        self.variables.clear();
        self.contexts.clear();
        self.contexts.push(ProgramContext::new_interpreter());
        self.status = Status::Running;
        self.current_time = 0.0;
        self.wait_until = None;
        debug!("booted");
    }

    pub fn options(&self) -> &CpuOptions {
        &self.options
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Session time in seconds, advanced by [`update`](Cpu::update).
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn functions(&self) -> &FunctionManager {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionManager {
        &mut self.functions
    }

    pub fn host_mut(&mut self) -> &mut dyn Host {
        &mut *self.host
    }

    // === Waiting ===

    /// Suspend the mainline. With `seconds > 0` it resumes by itself once
    /// the session time passes the wake time; otherwise only
    /// [`end_wait`](Cpu::end_wait) resumes it.
    pub fn start_wait(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.wait_until = Some(self.current_time + seconds);
        }
        self.status = Status::Waiting;
    }

    pub fn end_wait(&mut self) {
        self.wait_until = None;
        self.status = Status::Running;
    }

    // === Variables ===

    pub fn add_variable(&mut self, mut variable: Variable) {
        let key = variable_key(&variable.name);
        variable.name = key.clone();
        self.variables.insert(key, variable);
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(&variable_key(name))
    }

    /// Forget every user variable. Lock pointers survive so locks keep
    /// working.
    pub fn remove_all_variables(&mut self) {
        self.variables.retain(|name, _| is_pointer_name(name));
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(&variable_key(name))
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Resolve a variable reference. Other values are returned unchanged.
    pub fn get_value(&self, value: &Value) -> Result<Value, ExecutionError> {
        self.resolve(value.clone())
    }

    fn resolve(&self, value: Value) -> Result<Value, ExecutionError> {
        match value {
            Value::Identifier(name) => self
                .variable(&name)
                .map(|variable| variable.value.clone())
                .ok_or(ExecutionError::UndefinedVariable(name)),
            other => Ok(other),
        }
    }

    /// Assign, creating the variable when missing.
    pub fn set_value(&mut self, name: &str, value: Value) {
        let key = variable_key(name);
        match self.variables.get_mut(&key) {
            Some(variable) => variable.value = value,
            None => {
                self.variables.insert(key.clone(), Variable::new(key, value));
            }
        }
    }

    // === Stack access for built-ins ===

    pub fn push(&mut self, value: Value) -> Result<(), ExecutionError> {
        self.stack.push(value)
    }

    /// Pop a value, resolving variable references.
    pub fn pop_value(&mut self) -> Result<Value, ExecutionError> {
        let value = self.stack.pop_value()?;
        self.resolve(value)
    }

    /// Pop a value as pushed, without resolving it.
    pub fn pop_raw(&mut self) -> Result<Value, ExecutionError> {
        self.stack.pop_value()
    }

    // === Contexts ===

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    pub fn current_context(&self) -> Option<&ProgramContext> {
        self.contexts.last()
    }

    pub fn current_context_mut(&mut self) -> Option<&mut ProgramContext> {
        self.contexts.last_mut()
    }

    pub fn interpreter(&self) -> Option<&ProgramContext> {
        self.contexts.first()
    }

    /// Stash lock pointers and make `context` the running one.
    pub fn push_context(&mut self, mut context: ProgramContext) {
        let pointers: Vec<EcoString> = self
            .variables
            .keys()
            .filter(|name| is_pointer_name(name))
            .cloned()
            .collect();
        for name in pointers {
            if let Some(pointer) = self.variables.remove(&name) {
                context.saved_pointers.push(pointer);
            }
        }
        debug!(
            depth = self.contexts.len() + 1,
            stashed = context.saved_pointers.len(),
            "pushed context"
        );
        self.contexts.push(context);
        if self.contexts.len() > 1 {
            self.host.set_input_lock(true);
        }
    }

    /// Remove the running context, hand its flight controls back and
    /// restore the pointers it stashed.
    pub fn pop_context(&mut self) -> Option<ProgramContext> {
        let mut popped = self.contexts.pop()?;
        for (channel, enabled) in &popped.fly_by_wire {
            if *enabled {
                self.host.toggle_fly_by_wire(channel, false);
            }
        }
        if let Some(current) = self.contexts.last() {
            for (channel, enabled) in &current.fly_by_wire {
                if *enabled {
                    self.host.toggle_fly_by_wire(channel, true);
                }
            }
        }
        let saved = core::mem::take(&mut popped.saved_pointers);
        debug!(
            depth = self.contexts.len(),
            restored = saved.len(),
            "popped context"
        );
        self.restore_pointers(saved);
        if self.contexts.len() == 1 {
            self.host.set_input_lock(false);
        }
        Some(popped)
    }

    fn restore_pointers(&mut self, saved: Vec<Variable>) {
        for pointer in saved {
            let key = variable_key(&pointer.name);
            // Redefined inside the program: the inner pointer is stale out
            // here, and so is the trigger of the outer one.
            if self.variables.remove(&key).is_some() {
                if let (Value::Address(address), Some(current)) =
                    (&pointer.value, self.contexts.last_mut())
                {
                    current.remove_trigger(*address);
                }
            } else {
                self.variables.insert(key, pointer);
            }
        }
    }

    fn pop_to_interpreter(&mut self) {
        while self.contexts.len() > 1 {
            self.pop_context();
        }
    }

    /// The program context, pushing an empty one when only the
    /// interpreter exists.
    pub fn program_context(&mut self) -> &mut ProgramContext {
        if self.contexts.len() <= 1 {
            self.push_context(ProgramContext::new_program(false));
        }
        let top = self.contexts.len() - 1;
        &mut self.contexts[top]
    }

    /// Start a linked program in a new context. Empty programs are ignored.
    pub fn run_program(&mut self, program: Program, silent: bool) {
        if program.is_empty() {
            return;
        }
        self.push_context(ProgramContext::with_program(program, silent));
    }

    /// Append freshly compiled interpreter code. The instruction pointer,
    /// pending call frames and stored addresses follow their opcodes.
    pub fn link_interpreter_parts(&mut self, parts: Vec<CodePart>) -> Result<(), LinkError> {
        let Some(interpreter) = self.contexts.first_mut() else {
            return Ok(());
        };
        let old = interpreter.add_parts(parts)?;
        let program = interpreter.program.clone();
        let relocate = |address: usize| program.relocate(&old, address);

        if self.contexts.len() == 1 {
            self.stack.relocate_frames(relocate);
            for variable in self.variables.values_mut() {
                if let Value::Address(address) = &mut variable.value {
                    *address = relocate(*address);
                }
            }
        } else if let Some(program_context) = self.contexts.get_mut(1) {
            for pointer in &mut program_context.saved_pointers {
                if let Value::Address(address) = &mut pointer.value {
                    *address = relocate(*address);
                }
            }
        }
        Ok(())
    }

    /// Record a flight control change for the running context.
    pub fn toggle_fly_by_wire(&mut self, channel: &str, enabled: bool) {
        self.host.toggle_fly_by_wire(channel, enabled);
        if let Some(current) = self.contexts.last_mut() {
            current
                .fly_by_wire
                .insert(EcoString::from(channel), enabled);
        }
    }

    /// Stop what is running. `manual` is a user abort, which unwinds every
    /// program; otherwise only the running program ends.
    pub fn break_execution(&mut self, manual: bool) {
        if self.contexts.len() > 1 {
            self.end_wait();
            if manual {
                self.pop_to_interpreter();
                self.host.print("Program aborted.");
                self.host.unbind_all();
            } else {
                let silent = self.pop_context().is_some_and(|context| context.silent);
                if self.contexts.len() == 1 && !silent {
                    self.host.print("Program ended.");
                    self.host.unbind_all();
                }
            }
        } else if let Some(interpreter) = self.contexts.last_mut() {
            interpreter.clear_triggers();
            skip_current_instruction_id(interpreter);
            if manual {
                self.end_wait();
            }
        }
    }

    // === Scheduling ===

    /// Advance session time by `delta` seconds and run one tick: triggers,
    /// then the wait check, then the mainline, all within one instruction
    /// budget.
    ///
    /// # Errors
    ///
    /// Faults are contained before they are returned: the CPU is already
    /// back in a state that accepts new work.
    pub fn update(&mut self, delta: f64) -> Result<(), ExecutionError> {
        self.current_time += delta;
        let mut budget = self.options.instructions_per_update;
        match self.tick(&mut budget) {
            Ok(()) => Ok(()),
            Err(error) => {
                self.contain(&error);
                Err(error)
            }
        }
    }

    fn tick(&mut self, budget: &mut usize) -> Result<(), ExecutionError> {
        self.process_triggers(budget)?;

        if self.status == Status::Waiting
            && self.wait_until.is_some_and(|wake| self.current_time >= wake)
        {
            self.end_wait();
        }

        while self.status == Status::Running && *budget > 0 && !self.contexts.is_empty() {
            match self.step()? {
                Flow::Continue => *budget -= 1,
                Flow::EndOfFunction | Flow::EndOfProgram => break,
            }
        }
        Ok(())
    }

    fn process_triggers(&mut self, budget: &mut usize) -> Result<(), ExecutionError> {
        let depth = self.contexts.len();
        let Some(context) = self.contexts.last() else {
            return Ok(());
        };
        let triggers = context.triggers.clone();

        for address in triggers {
            if self.contexts.len() != depth {
                break;
            }
            let Some(context) = self.contexts.last_mut() else {
                break;
            };
            if !context.has_trigger(address) {
                continue;
            }
            let saved = core::mem::replace(&mut context.instruction_pointer, address);
            let mark = self.stack.mark();

            let result = self.run_trigger(budget);

            let same_context = self.contexts.len() == depth;
            if same_context {
                if let Some(context) = self.contexts.last_mut() {
                    context.instruction_pointer = saved;
                }
            }
            match result {
                Ok(()) => {}
                Err(ExecutionError::LongTrigger { budget }) => {
                    warn!(address, budget, "trigger ran out of instructions");
                    self.stack.unwind_to(mark);
                    break;
                }
                // The interpreter mainline is not at fault: drop the trigger
                // and keep going.
                Err(error) if depth == 1 && same_context => {
                    self.report(&error);
                    self.stack.unwind_to(mark);
                    if let Some(context) = self.contexts.last_mut() {
                        context.remove_trigger(address);
                    }
                }
                Err(error) => {
                    if same_context {
                        if let Some(context) = self.contexts.last_mut() {
                            context.remove_trigger(address);
                        }
                    }
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    fn run_trigger(&mut self, budget: &mut usize) -> Result<(), ExecutionError> {
        loop {
            if *budget == 0 {
                return Err(ExecutionError::LongTrigger {
                    budget: self.options.instructions_per_update,
                });
            }
            match self.step()? {
                Flow::Continue => *budget -= 1,
                Flow::EndOfFunction | Flow::EndOfProgram => return Ok(()),
            }
        }
    }

    fn report(&mut self, fault: &ExecutionError) {
        error!(
            error = %fault,
            contexts = self.contexts.len(),
            "{}",
            self.stack.dump(self.options.stack_dump_lines)
        );
        self.host.print(&fault.to_string());
    }

    /// Report a fault and unwind to a state that can take new commands.
    fn contain(&mut self, fault: &ExecutionError) {
        self.report(fault);

        if self.contexts.len() == 1 {
            let outermost_call = self
                .stack
                .call_trace()
                .last()
                .map(|frame| frame.return_address.saturating_sub(1));
            if let Some(interpreter) = self.contexts.last_mut() {
                if let Some(address) = outermost_call {
                    interpreter.instruction_pointer = address;
                }
                skip_current_instruction_id(interpreter);
            }
        } else {
            self.end_wait();
            self.pop_to_interpreter();
        }
        self.stack.clear();
    }
}

/// Move past every opcode of the current compile group. Landing outside
/// main code means the group was the last one: park on the end marker.
fn skip_current_instruction_id(context: &mut ProgramContext) {
    let code = &context.program.code;
    let last = code.len().saturating_sub(1);
    let mut ip = context.instruction_pointer;
    if let Some(id) = code.get(ip).map(|opcode| opcode.instruction_id) {
        while code.get(ip).is_some_and(|opcode| opcode.instruction_id == id) {
            ip += 1;
        }
    }
    if ip < context.program.entry_point || ip > last {
        ip = last;
    }
    context.instruction_pointer = ip;
}
