//! Configuration options for the compiler and the CPU.

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use kerbo_core::api::CompilationOptions;
///
/// let options = CompilationOptions {
///     context_id: "program".into(),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CompilationOptions {
    /// Name of the compile session to reuse.
    ///
    /// Sessions with the same id share label numbering, locks and triggers.
    /// An empty id compiles in a fresh, throwaway session.
    ///
    /// Default: "interpreter"
    pub context_id: String,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            context_id: String::from("interpreter"),
        }
    }
}

/// Configuration options for the CPU.
///
/// These control the per-tick budget and resource limits.
///
/// # Example
///
/// ```
/// use kerbo_core::api::CpuOptions;
///
/// let options = CpuOptions {
///     instructions_per_update: 50,
///     ..CpuOptions::default()
/// };
/// assert_eq!(options.max_stack_depth, 1000);
/// ```
#[derive(Debug, Clone)]
pub struct CpuOptions {
    /// Instructions executed per call to `Cpu::update`, shared between
    /// triggers and the mainline program.
    ///
    /// Default: 200
    pub instructions_per_update: usize,

    /// Maximum number of entries on the stack.
    ///
    /// Default: 1000
    pub max_stack_depth: usize,

    /// Reject NaN and Infinity when they are pushed.
    ///
    /// Default: true
    pub safe_mode: bool,

    /// Number of stack entries included in fault dumps.
    ///
    /// Default: 15
    pub stack_dump_lines: usize,
}

impl Default for CpuOptions {
    fn default() -> Self {
        Self {
            instructions_per_update: 200,
            max_stack_depth: 1000,
            safe_mode: true,
            stack_dump_lines: 15,
        }
    }
}
