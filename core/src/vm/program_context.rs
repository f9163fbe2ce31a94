use ecow::EcoString;
use hashbrown::HashMap;
use tracing::trace;

use crate::compiler::CodePart;
use crate::linker::{LinkError, LinkMode, Program, ProgramBuilder};
use crate::values::Variable;

/// One entry of the CPU's context stack: a linked program and where it is.
#[derive(Debug, Clone)]
pub struct ProgramContext {
    pub program: Program,
    pub instruction_pointer: usize,
    /// Active trigger addresses, in registration order.
    pub triggers: Vec<usize>,
    /// Flight control channels this context took over.
    pub fly_by_wire: HashMap<EcoString, bool>,
    /// Nothing is printed when a silent context ends.
    pub silent: bool,
    /// Lock pointers of the context beneath, restored on pop.
    pub saved_pointers: Vec<Variable>,
    builder: ProgramBuilder,
}

impl ProgramContext {
    fn new(mode: LinkMode, silent: bool) -> Self {
        Self {
            program: Program::default(),
            instruction_pointer: 0,
            triggers: Vec::new(),
            fly_by_wire: HashMap::new(),
            silent,
            saved_pointers: Vec::new(),
            builder: ProgramBuilder::new(mode),
        }
    }

    /// The interactive context at the bottom of the stack. Its program
    /// grows as lines are compiled and always ends with `Eof`.
    pub fn new_interpreter() -> Self {
        Self::empty(LinkMode::Interpreter, true)
    }

    /// A program context holding only its `Eop`, filled with
    /// [`add_parts`](Self::add_parts).
    pub fn new_program(silent: bool) -> Self {
        Self::empty(LinkMode::Program, silent)
    }

    fn empty(mode: LinkMode, silent: bool) -> Self {
        let mut context = Self::new(mode, silent);
        // An empty build is a lone end marker and cannot fail.
        if let Ok(program) = context.builder.build() {
            context.instruction_pointer = program.entry_point;
            context.program = program;
        }
        context
    }

    /// A context around an already linked program, starting at its first
    /// opcode so the initialization section runs.
    pub fn with_program(program: Program, silent: bool) -> Self {
        Self {
            program,
            ..Self::new(LinkMode::Program, silent)
        }
    }

    pub fn mode(&self) -> LinkMode {
        self.builder.mode()
    }

    /// Link more code into this context and keep the instruction pointer
    /// on the same opcode. Returns the previous program so the caller can
    /// relocate anything else that holds addresses.
    pub fn add_parts(
        &mut self,
        parts: impl IntoIterator<Item = CodePart>,
    ) -> Result<Program, LinkError> {
        self.builder.add_parts(parts);
        let program = self.builder.build()?;
        let old = core::mem::replace(&mut self.program, program);
        self.instruction_pointer = self.program.relocate(&old, self.instruction_pointer);
        for trigger in &mut self.triggers {
            *trigger = self.program.relocate(&old, *trigger);
        }
        trace!(
            opcodes = self.program.len(),
            instruction_pointer = self.instruction_pointer,
            "relinked context"
        );
        Ok(old)
    }

    /// Registers a trigger once; later registrations are ignored.
    pub fn add_trigger(&mut self, address: usize) {
        if !self.triggers.contains(&address) {
            self.triggers.push(address);
        }
    }

    pub fn remove_trigger(&mut self, address: usize) {
        self.triggers.retain(|&t| t != address);
    }

    pub fn has_trigger(&self, address: usize) -> bool {
        self.triggers.contains(&address)
    }

    pub fn clear_triggers(&mut self) {
        self.triggers.clear();
    }

    /// Listing of the opcodes around the instruction pointer, `lines` on
    /// each side, with the current one marked.
    pub fn code_fragment(&self, lines: usize) -> String {
        let ip = self.instruction_pointer;
        let start = ip.saturating_sub(lines);
        let end = (ip + lines + 1).min(self.program.len());
        let mut out = String::new();
        for address in start..end {
            if let Some(opcode) = self.program.get(address) {
                let marker = if address == ip { "-->" } else { "   " };
                out.push_str(&format!("{} {:04}  {}\n", marker, address, opcode));
            }
        }
        out
    }
}
