use ecow::EcoString;
use thiserror::Error;

/// Errors raised while executing opcodes.
///
/// Every variant except [`LongTrigger`](ExecutionError::LongTrigger) is
/// fatal to the running context; the CPU unwinds and reports it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("Variable {0} is not defined")]
    UndefinedVariable(EcoString),

    #[error("Call to non-existent function {0}")]
    UnknownFunction(EcoString),

    #[error("Stack overflow: more than {max} entries")]
    StackOverflow { max: usize },

    #[error("Stack underflow")]
    StackUnderflow,

    /// Safe mode rejections and call frames found where a value was needed.
    #[error("{0}")]
    InvalidStackValue(String),

    /// A trigger did not reach its end within the tick's budget.
    #[error("Trigger did not finish within {budget} instructions")]
    LongTrigger { budget: usize },

    #[error("Jump to invalid address {address}")]
    BadJump { address: isize },

    #[error("Cannot {operation} {left} and {right}")]
    TypeMismatch {
        operation: &'static str,
        left: EcoString,
        right: EcoString,
    },

    #[error("Suffix {0} not found on object")]
    SuffixNotFound(EcoString),

    #[error("Values of type {0} cannot have suffixes")]
    NoSuffixes(EcoString),

    #[error("Cannot convert {0} to a boolean")]
    NotBoolean(EcoString),

    #[error("{0}")]
    Runtime(String),
}

impl ExecutionError {
    pub fn runtime(message: impl Into<String>) -> Self {
        ExecutionError::Runtime(message.into())
    }

    /// Errors the scheduler recovers from without unwinding.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExecutionError::LongTrigger { .. })
    }
}
