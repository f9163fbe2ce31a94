//! Runtime values.

mod structure;
mod value;
mod variable;

pub use structure::Structure;
pub use value::Value;
pub use variable::{POINTER_MARKER, Variable, is_pointer_name, variable_key};
