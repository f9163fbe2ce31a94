//! KerboScript compiler.
//!
//! Turns a parse tree into labeled, stack-oriented opcodes grouped in
//! [`CodePart`]s. Labels are symbolic; addresses are assigned later by the
//! [linker](crate::linker).
//!
//! ## Design
//!
//! - A pre-processing pass hoists `on`/`when`/`wait until` bodies into
//!   triggers and `lock` expressions into functions
//! - The main pass walks the tree with one `match` per node kind
//! - All counters live in a [`Context`] passed by `&mut`, which is what lets
//!   the interactive interpreter compile line by line
//! - [`Script`] keeps named contexts and collects the parts that are new
//!   since the previous compile

mod code_part;
mod codegen;
mod context;
mod error;
mod label;
mod locks;
mod preprocess;
mod script;
mod triggers;

#[cfg(test)]
mod codegen_test;
#[cfg(test)]
mod script_test;

pub use code_part::CodePart;
pub use codegen::Compiler;
pub use context::Context;
pub use error::CompileError;
pub use label::Label;
pub use locks::{Lock, LockCollection, LockFunction};
pub use script::{INTERPRETER_CONTEXT, Script};
pub use triggers::{Trigger, TriggerCollection};
