use pest::error::{InputLocation, LineColLocation};
use thiserror::Error;

use crate::parser::{Rule, Span};

/// Syntax error with the position and the offending source line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Syntax error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub span: Span,
    /// The source line the error is on.
    pub snippet: String,
    pub message: String,
}

impl ParseError {
    /// Render the offending line with a caret under the error column.
    pub fn caret_snippet(&self) -> String {
        let pad = " ".repeat(self.column.saturating_sub(1));
        format!("{}\n{}^", self.snippet, pad)
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let (line, column) = match err.line_col {
            LineColLocation::Pos(pos) => pos,
            LineColLocation::Span(start, _) => start,
        };
        let span = match err.location {
            InputLocation::Pos(pos) => Span::new(pos, pos),
            InputLocation::Span((start, end)) => Span::new(start, end),
        };
        ParseError {
            line,
            column,
            span,
            snippet: err.line().to_string(),
            message: err.variant.message().to_string(),
        }
    }
}
