//! Kerbo - KerboScript for embedded, tick-driven hosts
//!
//! # Overview
//!
//! KerboScript is a small imperative language for automating vehicles. A
//! host compiles source text into flat opcodes and then calls
//! [`Session::update`] once per simulation tick. Each update runs a bounded
//! number of instructions, so scripts never stall the host.
//!
//! Scripts are written as sentences ending in a period:
//!
//! ```text
//! set target to 10000.
//! lock throttle to 1.
//! when altitude > target then { print "coasting". lock throttle to 0. }
//! wait until altitude > target + 500.
//! ```
//!
//! # Quick Start
//!
//! ```
//! use kerbo::{BufferHost, CpuOptions, Session, Value};
//!
//! let host = BufferHost::new();
//! let mut session = Session::new(CpuOptions::default(), host.clone());
//!
//! session.execute("set x to 1 + 2 * 3. print x.").unwrap();
//! session.update(0.02).unwrap();
//!
//! assert_eq!(host.lines(), vec!["7".to_string()]);
//! assert_eq!(session.value("x"), Some(Value::Int(7)));
//! ```
//!
//! # Hosts
//!
//! Everything a script does to the outside world goes through the
//! [`Host`] trait: printing, fly-by-wire channels, input locking, staging.
//! Extra built-ins are registered on the CPU's
//! [`FunctionManager`](kerbo_core::vm::FunctionManager) as closures:
//!
//! ```
//! use kerbo::{CpuOptions, NullHost, Session, Value};
//!
//! let mut session = Session::new(CpuOptions::default(), NullHost);
//! session.cpu_mut().functions_mut().register("altitude", |cpu: &mut kerbo::Cpu| {
//!     cpu.push(Value::Float(12000.0))
//! });
//! session.execute("set a to altitude().").unwrap();
//! session.update(0.02).unwrap();
//! assert_eq!(session.value("a"), Some(Value::Float(12000.0)));
//! ```

mod error;
mod error_renderer;
mod session;

pub use error::Error;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
pub use session::{PROGRAM_CONTEXT, Session, compile_program};

// Re-export the public API from kerbo_core
pub use kerbo_core::api::{CompilationOptions, CpuOptions};
pub use kerbo_core::compiler::{CompileError, Script};
pub use kerbo_core::linker::{LinkError, LinkMode, Program, ProgramBuilder};
pub use kerbo_core::parser::ParseError;
pub use kerbo_core::values::{Structure, Value};
pub use kerbo_core::vm::{BufferHost, Cpu, ExecutionError, Host, NullHost, Status};

pub use kerbo_core;
