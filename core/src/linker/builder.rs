use std::rc::Rc;

use hashbrown::HashMap;
use tracing::trace;

use super::{LinkError, Program};
use crate::compiler::{CodePart, Label};
use crate::values::Value;
use crate::vm::{Instruction, Opcode};

/// How a program ends and where initialization code goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Incremental interpreter: each part's initialization runs inline,
    /// right before its mainline, and the program ends with `Eof` so the
    /// next compiled line can continue from there.
    Interpreter,
    /// Stand-alone program: one initialization section up front, `Eop` at
    /// the end.
    Program,
}

/// Accumulates code parts and links them into a [`Program`].
#[derive(Debug, Clone)]
pub struct ProgramBuilder {
    mode: LinkMode,
    parts: Vec<CodePart>,
}

impl ProgramBuilder {
    pub fn new(mode: LinkMode) -> Self {
        Self {
            mode,
            parts: Vec::new(),
        }
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    pub fn add_part(&mut self, part: CodePart) {
        self.parts.push(part);
    }

    pub fn add_parts(&mut self, parts: impl IntoIterator<Item = CodePart>) {
        self.parts.extend(parts);
    }

    /// Lay out every part added so far and resolve all destinations.
    ///
    /// Layout: initialization, a jump over the functions (only when there
    /// are any), functions, mainline, end marker.
    pub fn build(&self) -> Result<Program, LinkError> {
        let mut initialization = Vec::new();
        let mut functions = Vec::new();
        let mut main = Vec::new();
        for part in &self.parts {
            match self.mode {
                LinkMode::Interpreter => main.extend(part.initialization_code.iter().cloned()),
                LinkMode::Program => {
                    initialization.extend(part.initialization_code.iter().cloned())
                }
            }
            functions.extend(part.functions_code.iter().cloned());
            main.extend(part.main_code.iter().cloned());
        }

        let mut code = initialization;
        if !functions.is_empty() {
            let mut jump = Opcode::new(Instruction::Jump);
            jump.target = Some(code.len() + 1 + functions.len());
            code.push(jump);
        }
        code.extend(functions);
        let entry_point = code.len();
        code.extend(main);
        code.push(Opcode::new(match self.mode {
            LinkMode::Interpreter => Instruction::Eof,
            LinkMode::Program => Instruction::Eop,
        }));

        resolve_labels(&mut code)?;
        trace!(opcodes = code.len(), entry_point, "linked program");
        Ok(Program {
            code: Rc::from(code),
            entry_point,
        })
    }
}

fn resolve_labels(code: &mut [Opcode]) -> Result<(), LinkError> {
    let addresses: HashMap<Label, usize> = code
        .iter()
        .enumerate()
        .filter_map(|(address, opcode)| opcode.label.map(|label| (label, address)))
        .collect();

    for opcode in code.iter_mut() {
        let Some(destination) = opcode.destination else {
            continue;
        };
        let target = *addresses
            .get(&destination)
            .ok_or(LinkError::UndefinedLabel(destination))?;
        opcode.target = Some(target);
        if let Instruction::Push(value) = &mut opcode.instruction {
            *value = Value::Address(target);
        }
    }
    Ok(())
}
