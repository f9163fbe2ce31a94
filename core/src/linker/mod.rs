//! Label resolution.
//!
//! The compiler only ever produces symbolic [`Label`](crate::compiler::Label)s.
//! The linker concatenates [`CodePart`](crate::compiler::CodePart)s into a
//! flat [`Program`] and turns every destination into an address.

mod builder;
mod program;

#[cfg(test)]
mod linker_test;

use thiserror::Error;

pub use builder::{LinkMode, ProgramBuilder};
pub use program::Program;

use crate::compiler::Label;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("Undefined label {0}")]
    UndefinedLabel(Label),

    #[error("Invalid program image: {0}")]
    Image(String),
}
