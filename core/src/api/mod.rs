//! Public configuration surface.

mod options;

pub use options::{CompilationOptions, CpuOptions};
