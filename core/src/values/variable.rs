use ecow::EcoString;

use super::Value;

/// Marker that distinguishes lock pointer cells from ordinary variables.
pub const POINTER_MARKER: char = '*';

/// A named global slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: EcoString,
    pub value: Value,
}

impl Variable {
    pub fn new(name: impl Into<EcoString>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Lock pointer cells are stashed when a program context is pushed.
    pub fn is_pointer(&self) -> bool {
        is_pointer_name(&self.name)
    }
}

pub fn is_pointer_name(name: &str) -> bool {
    name.contains(POINTER_MARKER)
}

/// Canonical table key: lower case without the `$` sigil.
pub fn variable_key(name: &str) -> EcoString {
    EcoString::from(name.trim_start_matches('$').to_ascii_lowercase())
}
