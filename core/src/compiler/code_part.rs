use crate::vm::Opcode;

/// One compilation unit, split into the three sections the linker lays out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodePart {
    /// Runs once, before anything else (lock pointer setup).
    pub initialization_code: Vec<Opcode>,
    pub main_code: Vec<Opcode>,
    /// Trigger bodies and lock functions. Only reachable by address.
    pub functions_code: Vec<Opcode>,
}

impl CodePart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.initialization_code.is_empty()
            && self.main_code.is_empty()
            && self.functions_code.is_empty()
    }

    pub fn len(&self) -> usize {
        self.initialization_code.len() + self.main_code.len() + self.functions_code.len()
    }

    /// Stamp every opcode with the compile group it belongs to.
    pub fn assign_instruction_id(&mut self, instruction_id: u32) {
        self.opcodes_mut()
            .for_each(|opcode| opcode.instruction_id = instruction_id);
    }

    pub fn opcodes(&self) -> impl Iterator<Item = &Opcode> {
        self.initialization_code
            .iter()
            .chain(self.functions_code.iter())
            .chain(self.main_code.iter())
    }

    fn opcodes_mut(&mut self) -> impl Iterator<Item = &mut Opcode> {
        self.initialization_code
            .iter_mut()
            .chain(self.functions_code.iter_mut())
            .chain(self.main_code.iter_mut())
    }
}
