//! Compilation errors.

use thiserror::Error;

use crate::parser::{NodeKind, ParseError};

/// Errors that can occur while turning source into code parts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Any failure inside the tree walk, tagged with the text of the last
    /// node visited.
    #[error("Error compiling \"{fragment}\": {source}")]
    Node {
        fragment: String,
        source: Box<CompileError>,
    },

    /// The tree does not have the shape its node kind promises.
    #[error("Malformed {kind} node: {reason}")]
    MalformedTree { kind: NodeKind, reason: &'static str },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CompileError {
    pub(crate) fn malformed(kind: NodeKind, reason: &'static str) -> Self {
        CompileError::MalformedTree { kind, reason }
    }

    /// The innermost error, skipping `Node` wrappers.
    pub fn root_cause(&self) -> &CompileError {
        match self {
            CompileError::Node { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
