mod parse_tree;
pub mod error;
pub mod parser;
mod syntax;

// Re-export the parser and rule enum for external use
pub use parser::KerboScriptParser;
pub use parser::Rule;
pub use parser::{normalize, parse};

pub use error::ParseError;
pub use parse_tree::{Node, ParseTree};
pub use syntax::{NodeKind, Span};

#[cfg(test)]
mod parse_test;

#[cfg(test)]
mod rule_valid_test;
