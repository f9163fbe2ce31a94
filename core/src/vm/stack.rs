use core::fmt;

use ecow::EcoString;

use super::ExecutionError;
use crate::values::Value;

/// Marker left on the stack by a pointer call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Address to resume at after `Return`.
    pub return_address: usize,
    /// Pointer cell the call went through.
    pub target: EcoString,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StackEntry {
    Value(Value),
    Frame(CallFrame),
}

impl fmt::Display for StackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackEntry::Value(value) => write!(f, "{:?}", value),
            StackEntry::Frame(frame) => {
                write!(f, "<call {} -> @{:04}>", frame.target, frame.return_address)
            }
        }
    }
}

/// Stack position saved before running a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackMark {
    pointer: isize,
    len: usize,
}

/// The VM's operand stack.
///
/// Unlike a plain `Vec`, the stack has an explicit pointer that may sit
/// below the last entry. A pointer call pushes its [`CallFrame`] and then
/// moves the pointer down, so values the callee pushes are inserted
/// underneath the frame; `Return` moves the pointer back up and pops the
/// frame. Everything above the pointer is therefore the pending call trace.
///
/// # Examples
///
/// ```
/// use kerbo_core::values::Value;
/// use kerbo_core::vm::Stack;
///
/// let mut stack = Stack::new(100, true);
/// stack.push(Value::Int(42)).unwrap();
/// stack.push(Value::Int(17)).unwrap();
/// assert_eq!(stack.pop_value().unwrap(), Value::Int(17));
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Stack {
    entries: Vec<StackEntry>,
    /// Index of the top entry below any pending frames; -1 when empty.
    pointer: isize,
    max_depth: usize,
    safe_mode: bool,
}

impl Stack {
    /// Creates a stack holding at most `max_depth` entries.
    ///
    /// With `safe_mode` on, pushing NaN or Infinity fails.
    pub fn new(max_depth: usize, safe_mode: bool) -> Self {
        Self {
            entries: Vec::with_capacity(max_depth.min(256)),
            pointer: -1,
            max_depth,
            safe_mode,
        }
    }

    /// Pushes a value at the pointer.
    ///
    /// # Errors
    ///
    /// `InvalidStackValue` for NaN/Infinity in safe mode, `StackOverflow`
    /// when the stack is full.
    pub fn push(&mut self, value: Value) -> Result<(), ExecutionError> {
        if self.safe_mode {
            validate(&value)?;
        }
        self.insert(StackEntry::Value(value))
    }

    /// Pushes a call frame at the pointer.
    pub fn push_frame(&mut self, frame: CallFrame) -> Result<(), ExecutionError> {
        self.insert(StackEntry::Frame(frame))
    }

    fn insert(&mut self, entry: StackEntry) -> Result<(), ExecutionError> {
        if self.entries.len() >= self.max_depth {
            return Err(ExecutionError::StackOverflow {
                max: self.max_depth,
            });
        }
        self.pointer += 1;
        self.entries.insert(self.pointer as usize, entry);
        Ok(())
    }

    /// Removes and returns the entry at the pointer.
    pub fn pop(&mut self) -> Result<StackEntry, ExecutionError> {
        if self.pointer < 0 {
            return Err(ExecutionError::StackUnderflow);
        }
        let entry = self.entries.remove(self.pointer as usize);
        self.pointer -= 1;
        Ok(entry)
    }

    /// Pops an entry that must be a value.
    pub fn pop_value(&mut self) -> Result<Value, ExecutionError> {
        match self.pop()? {
            StackEntry::Value(value) => Ok(value),
            StackEntry::Frame(frame) => Err(ExecutionError::InvalidStackValue(format!(
                "Expected a value but found the call frame of {}",
                frame.target
            ))),
        }
    }

    /// Pops an entry that must be a call frame.
    pub fn pop_frame(&mut self) -> Result<CallFrame, ExecutionError> {
        match self.pop()? {
            StackEntry::Frame(frame) => Ok(frame),
            StackEntry::Value(value) => Err(ExecutionError::InvalidStackValue(format!(
                "Expected a call frame but found {:?}",
                value
            ))),
        }
    }

    /// Entry `depth` positions below the pointer; 0 is the top. Never pops.
    pub fn peek(&self, depth: usize) -> Option<&StackEntry> {
        let index = self.pointer - depth as isize;
        if index < 0 {
            return None;
        }
        self.entries.get(index as usize)
    }

    pub fn move_pointer(&mut self, delta: isize) {
        self.pointer += delta;
    }

    /// Call frames above the pointer, innermost first.
    pub fn call_trace(&self) -> Vec<&CallFrame> {
        let start = (self.pointer + 1) as usize;
        self.entries[start.min(self.entries.len())..]
            .iter()
            .filter_map(|entry| match entry {
                StackEntry::Frame(frame) => Some(frame),
                StackEntry::Value(_) => None,
            })
            .collect()
    }

    /// Rewrite every stored return address.
    pub fn relocate_frames(&mut self, mut relocate: impl FnMut(usize) -> usize) {
        for entry in &mut self.entries {
            if let StackEntry::Frame(frame) = entry {
                frame.return_address = relocate(frame.return_address);
            }
        }
    }

    pub fn mark(&self) -> StackMark {
        StackMark {
            pointer: self.pointer,
            len: self.entries.len(),
        }
    }

    /// Drop everything pushed since `mark`, leaving entries that were above
    /// the pointer at the time (pending frames) in place.
    pub fn unwind_to(&mut self, mark: StackMark) {
        let extra = self.entries.len().saturating_sub(mark.len);
        let start = ((mark.pointer + 1) as usize).min(self.entries.len());
        let end = (start + extra).min(self.entries.len());
        self.entries.drain(start..end);
        self.pointer = mark.pointer;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = -1;
    }

    /// Total number of entries, including frames above the pointer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last `lines` entries, bottom to top.
    pub fn dump(&self, lines: usize) -> String {
        let mut out = String::from("Stack dump:\n");
        let start = self.entries.len().saturating_sub(lines);
        for (index, entry) in self.entries.iter().enumerate().skip(start) {
            let marker = if index as isize == self.pointer { "<" } else { "" };
            out.push_str(&format!("{:03}    {} {}\n", index, entry, marker));
        }
        out
    }
}

fn validate(value: &Value) -> Result<(), ExecutionError> {
    if let Value::Float(f) = value {
        if f.is_nan() {
            return Err(ExecutionError::InvalidStackValue(
                "Tried to push NaN into the stack.".into(),
            ));
        }
        if f.is_infinite() {
            return Err(ExecutionError::InvalidStackValue(
                "Tried to push Infinity into the stack.".into(),
            ));
        }
    }
    Ok(())
}
