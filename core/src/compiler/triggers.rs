use ecow::{EcoString, eco_format};
use hashbrown::HashMap;

use super::{CodePart, Label};
use crate::vm::Opcode;

/// A hoisted handler body (`on`, `when`, `wait until`, system lock refresh).
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub identifier: EcoString,
    /// Watched variable of an `on` trigger.
    pub variable_name: EcoString,
    /// Companion variable holding the last seen value, `old-<name>`.
    pub variable_name_old_value: EcoString,
    pub code: Vec<Opcode>,
}

impl Trigger {
    pub fn new(identifier: impl Into<EcoString>) -> Self {
        Self {
            identifier: identifier.into(),
            variable_name: EcoString::new(),
            variable_name_old_value: EcoString::new(),
            code: Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.code.is_empty()
    }

    pub fn set_trigger_variable(&mut self, name: &str) {
        self.variable_name = EcoString::from(name);
        self.variable_name_old_value = eco_format!("old-{}", name.to_ascii_lowercase());
    }

    /// Entry point: the label of the first opcode.
    pub fn function_label(&self) -> Option<Label> {
        self.code.first().and_then(|opcode| opcode.label)
    }

    fn code_part(&self) -> CodePart {
        CodePart {
            functions_code: self.code.clone(),
            ..CodePart::new()
        }
    }
}

/// Triggers known to one compile session.
///
/// Identity is the trigger identifier, which embeds the statement's source
/// offset. Re-compiling a different statement at the same offset finds the
/// existing trigger.
#[derive(Debug, Clone, Default)]
pub struct TriggerCollection {
    triggers: HashMap<EcoString, Trigger>,
    new_triggers: Vec<EcoString>,
}

impl TriggerCollection {
    pub fn contains(&self, identifier: &str) -> bool {
        self.triggers.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&Trigger> {
        self.triggers.get(identifier)
    }

    pub fn insert(&mut self, trigger: Trigger) {
        self.new_triggers.push(trigger.identifier.clone());
        self.triggers.insert(trigger.identifier.clone(), trigger);
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// One part per trigger created since the last flush, in creation order.
    pub fn take_new_parts(&mut self) -> Vec<CodePart> {
        let new_triggers = core::mem::take(&mut self.new_triggers);
        new_triggers
            .iter()
            .filter_map(|identifier| self.triggers.get(identifier))
            .map(Trigger::code_part)
            .collect()
    }
}
