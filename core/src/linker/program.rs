use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::LinkError;
use crate::compiler::Label;
use crate::vm::Opcode;

/// A linked program: every destination resolved to an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub code: Rc<[Opcode]>,
    /// Address of the first mainline opcode.
    pub entry_point: usize,
}

impl Default for Program {
    fn default() -> Self {
        Self {
            code: Rc::from(Vec::new()),
            entry_point: 0,
        }
    }
}

impl Program {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn get(&self, address: usize) -> Option<&Opcode> {
        self.code.get(address)
    }

    pub fn address_of(&self, label: Label) -> Option<usize> {
        self.code
            .iter()
            .position(|opcode| opcode.label == Some(label))
    }

    /// Where the opcode that sat at `address` in `old` lives in this
    /// program. Addresses that point at linker scaffolding in the mainline
    /// (the end marker) map to just after the last mainline opcode that
    /// preceded them.
    pub fn relocate(&self, old: &Program, address: usize) -> usize {
        if let Some(label) = old.get(address).and_then(|opcode| opcode.label) {
            return self.address_of(label).unwrap_or(address);
        }
        if address < old.entry_point {
            return address;
        }
        (old.entry_point..address)
            .rev()
            .find_map(|previous| old.get(previous).and_then(|opcode| opcode.label))
            .and_then(|label| self.address_of(label))
            .map_or(self.entry_point, |found| found + 1)
    }

    /// Human readable listing, one opcode per line.
    pub fn listing(&self) -> String {
        self.code
            .iter()
            .enumerate()
            .map(|(address, opcode)| {
                let marker = if address == self.entry_point { ">" } else { " " };
                format!("{}{:04}  {}\n", marker, address, opcode)
            })
            .collect()
    }

    /// Serialize to a compact binary image.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LinkError> {
        postcard::to_allocvec(self).map_err(|e| LinkError::Image(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LinkError> {
        postcard::from_bytes(bytes).map_err(|e| LinkError::Image(e.to_string()))
    }
}
