use core::fmt;

use serde::{Deserialize, Serialize};
use static_assertions::assert_eq_size;

/// Opaque handle naming a code position.
///
/// Labels are allocated by a [`Context`](super::Context) in strictly
/// increasing order and resolved to addresses only by the linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Label(pub u32);

assert_eq_size!(Label, u32);
assert_eq_size!(Option<Label>, u64);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KL_{:04}", self.0)
    }
}
