use ecow::EcoString;
use hashbrown::HashMap;
use lazy_static::lazy_static;

use super::{CodePart, Label};
use crate::values::POINTER_MARKER;
use crate::vm::Opcode;

lazy_static! {
    /// Locks that drive a flight control channel and need a refresh trigger.
    static ref SYSTEM_LOCKS: [&'static str; 4] =
        ["throttle", "steering", "wheelthrottle", "wheelsteering"];
}

/// A compiled lock expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LockFunction {
    /// Literal source text of the expression the function was compiled from.
    pub expression: EcoString,
    pub code: Vec<Opcode>,
}

impl LockFunction {
    pub fn label(&self) -> Option<Label> {
        self.code.first().and_then(|opcode| opcode.label)
    }
}

/// A named binding whose value is recomputed on every read.
///
/// Reading the lock calls whatever function its pointer cell holds. The
/// default function yields the plain variable of the same name, which is
/// what `unlock` restores.
#[derive(Debug, Clone)]
pub struct Lock {
    pub identifier: EcoString,
    /// Name of the pointer cell, `identifier*`.
    pub pointer_identifier: EcoString,
    pub default_label: Label,
    pub initialization_code: Vec<Opcode>,
    default_function: Vec<Opcode>,
    functions: Vec<LockFunction>,
    by_expression: HashMap<EcoString, usize>,
    /// Functions at or past this index have not been handed out yet.
    flushed: usize,
}

impl Lock {
    pub fn new(identifier: &str, default_label: Label) -> Self {
        let mut pointer_identifier = EcoString::from(identifier);
        pointer_identifier.push(POINTER_MARKER);
        Self {
            identifier: EcoString::from(identifier),
            pointer_identifier,
            default_label,
            initialization_code: Vec::new(),
            default_function: Vec::new(),
            functions: Vec::new(),
            by_expression: HashMap::new(),
            flushed: 0,
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.initialization_code.is_empty()
    }

    pub fn is_system_lock(&self) -> bool {
        SYSTEM_LOCKS.contains(&self.identifier.as_str())
    }

    pub fn set_default_function(&mut self, code: Vec<Opcode>) {
        self.default_function = code;
    }

    pub fn function(&self, expression: &str) -> Option<&LockFunction> {
        self.by_expression
            .get(expression)
            .map(|&index| &self.functions[index])
    }

    pub fn add_function(&mut self, expression: &str, code: Vec<Opcode>) -> &LockFunction {
        let index = self.functions.len();
        self.functions.push(LockFunction {
            expression: EcoString::from(expression),
            code,
        });
        self.by_expression.insert(EcoString::from(expression), index);
        &self.functions[index]
    }

    pub fn functions(&self) -> &[LockFunction] {
        &self.functions
    }

    pub fn has_new_functions(&self) -> bool {
        self.flushed < self.functions.len()
    }

    /// Everything the lock owns: initialization, default and all functions.
    fn code_part(&mut self) -> CodePart {
        let mut part = CodePart::new();
        part.initialization_code = self.initialization_code.clone();
        part.functions_code = self.default_function.clone();
        for function in &self.functions {
            part.functions_code.extend(function.code.iter().cloned());
        }
        self.flushed = self.functions.len();
        part
    }

    /// Functions added since the last flush.
    fn new_functions_code_part(&mut self) -> CodePart {
        let mut part = CodePart::new();
        for function in &self.functions[self.flushed..] {
            part.functions_code.extend(function.code.iter().cloned());
        }
        self.flushed = self.functions.len();
        part
    }
}

/// Locks known to one compile session, in creation order.
#[derive(Debug, Clone, Default)]
pub struct LockCollection {
    locks: Vec<Lock>,
    by_name: HashMap<EcoString, usize>,
    /// Locks at or past this index are new since the last flush.
    flushed: usize,
}

impl LockCollection {
    pub fn contains(&self, identifier: &str) -> bool {
        self.by_name.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&Lock> {
        self.by_name.get(identifier).map(|&index| &self.locks[index])
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut Lock> {
        self.by_name
            .get(identifier)
            .map(|&index| &mut self.locks[index])
    }

    pub fn insert(&mut self, lock: Lock) -> &mut Lock {
        let index = self.locks.len();
        self.by_name.insert(lock.identifier.clone(), index);
        self.locks.push(lock);
        &mut self.locks[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lock> {
        self.locks.iter()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Parts not handed out yet: whole new locks first, then the new
    /// functions of locks that were already flushed.
    pub fn take_new_parts(&mut self) -> Vec<CodePart> {
        let flushed = self.flushed;
        let mut parts: Vec<CodePart> = self.locks[flushed..]
            .iter_mut()
            .map(Lock::code_part)
            .collect();
        for lock in &mut self.locks[..flushed] {
            if lock.has_new_functions() {
                parts.push(lock.new_functions_code_part());
            }
        }
        self.flushed = self.locks.len();
        parts
    }
}
