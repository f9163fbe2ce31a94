//! The cooperative virtual machine.
//!
//! A [`Cpu`] runs linked [`Program`](crate::linker::Program)s one tick at a
//! time. Each tick has a fixed instruction budget that triggers and the
//! mainline share; anything unfinished resumes on the next tick from the
//! saved instruction pointer.

mod cpu;
mod error;
mod execute;
mod functions;
mod host;
mod instruction_set;
pub mod operators;
mod program_context;
mod stack;


pub use cpu::{Cpu, Status};
pub use error::ExecutionError;
pub use functions::{Function, FunctionManager};
pub use host::{BufferHost, Host, NullHost};
pub use instruction_set::{Builtin, CallTarget, Instruction, Opcode};
pub use program_context::ProgramContext;
pub use stack::{CallFrame, Stack, StackEntry, StackMark};
