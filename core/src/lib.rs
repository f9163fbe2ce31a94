//! Compiler and cooperative virtual machine for KerboScript.
//!
//! The pipeline is `parser` → `compiler` → `linker` → `vm`. Everything the
//! VM runs is plain data ([`vm::Opcode`]), so a host can compile once and
//! execute under its own per-tick instruction budget.

pub mod api;
pub mod compiler;
pub mod linker;
pub mod parser;
pub mod stdlib;
pub mod values;
pub mod vm;
