use kerbo_core::compiler::CompileError;
use kerbo_core::linker::LinkError;
use kerbo_core::vm::ExecutionError;
use miette::Diagnostic;
use thiserror::Error;

/// Anything that can go wrong between source text and a finished tick.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum Error {
    /// The source did not parse or compile. Keeps the text so the error can
    /// be rendered against it.
    #[error("{error}")]
    #[diagnostic(code(kerbo::compile))]
    Compile {
        text: String,
        error: CompileError,
    },

    #[error(transparent)]
    #[diagnostic(code(kerbo::link))]
    Link(#[from] LinkError),

    /// A fault the CPU already contained and reported through the host.
    #[error(transparent)]
    #[diagnostic(code(kerbo::execution))]
    Execution(#[from] ExecutionError),
}

impl Error {
    pub(crate) fn compile(source: &str, error: CompileError) -> Self {
        Error::Compile {
            text: source.to_string(),
            error,
        }
    }
}
