//! Registry of callable built-ins.

use std::rc::Rc;

use ecow::EcoString;
use hashbrown::HashMap;

use super::{Cpu, ExecutionError};

/// A built-in the VM can call by name.
///
/// Functions take their arguments from the CPU's stack (last argument on
/// top) and push their result, if they have one. Statement built-ins such
/// as `print` push nothing.
///
/// Any `Fn(&mut Cpu) -> Result<(), ExecutionError>` closure is a function.
pub trait Function {
    fn execute(&self, cpu: &mut Cpu) -> Result<(), ExecutionError>;
}

impl<F> Function for F
where
    F: Fn(&mut Cpu) -> Result<(), ExecutionError>,
{
    fn execute(&self, cpu: &mut Cpu) -> Result<(), ExecutionError> {
        self(cpu)
    }
}

/// Maps bare function names (`sin`, `print`) to implementations.
///
/// # Example
///
/// ```
/// use kerbo_core::values::Value;
/// use kerbo_core::vm::{Cpu, FunctionManager};
///
/// let mut functions = FunctionManager::new();
/// functions.register("answer", |cpu: &mut Cpu| cpu.push(Value::Int(42)));
/// assert!(functions.contains("ANSWER"));
/// ```
#[derive(Default, Clone)]
pub struct FunctionManager {
    functions: HashMap<EcoString, Rc<dyn Function>>,
}

impl FunctionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace `name`. Names are case-insensitive.
    pub fn register(&mut self, name: &str, function: impl Function + 'static) {
        self.functions
            .insert(EcoString::from(name.to_ascii_lowercase()), Rc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Function>> {
        self.functions.get(name.to_ascii_lowercase().as_str()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions
            .contains_key(name.to_ascii_lowercase().as_str())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.functions
            .remove(name.to_ascii_lowercase().as_str())
            .is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<EcoString> {
        let mut names: Vec<EcoString> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl core::fmt::Debug for FunctionManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FunctionManager")
            .field("functions", &self.names())
            .finish()
    }
}
