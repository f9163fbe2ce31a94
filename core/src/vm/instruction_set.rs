//! KerboScript VM instructions.
//!
//! The VM is stack based: operands are popped from the [`Stack`](super::Stack)
//! and results pushed back. Values that name variables (`$x`) are resolved
//! when an instruction needs a value, not when they are pushed.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`

use core::fmt;

use ecow::EcoString;
use serde::{Deserialize, Serialize};

use crate::compiler::Label;
use crate::values::Value;

/// A single VM instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    // ========================================================================
    // Stack
    // ========================================================================
    /// Push a literal. When the opcode carries a destination the linker
    /// replaces the literal with the destination address.
    /// Stack: [...] -> [..., value]
    Push(Value),

    /// Assign to a variable, creating it when missing.
    /// Stack: [..., $name, value] -> [...]
    Store,

    /// Stack: [..., a] -> [..., a, a]
    Dup,

    /// Stack: [..., a, b] -> [..., b, a]
    Swap,

    // ========================================================================
    // Suffixes
    // ========================================================================
    /// Stack: [..., object, "suffix"] -> [..., value]
    GetMember,

    /// Stack: [..., object, "suffix", value] -> [...]
    SetMember,

    // ========================================================================
    // Markers
    // ========================================================================
    /// End of a function region (trigger or mainline chunk).
    Eof,

    /// End of program: the running context finishes.
    Eop,

    Nop,

    // ========================================================================
    // Control flow
    // ========================================================================
    /// Stack: [..., condition] -> [...]
    BranchIfFalse,

    Jump,

    // ========================================================================
    // Comparison
    // ========================================================================
    CompareGt,
    CompareLt,
    CompareGte,
    CompareLte,
    CompareEqual,
    CompareNotEqual,

    // ========================================================================
    // Arithmetic
    // ========================================================================
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,

    // ========================================================================
    // Logic
    // ========================================================================
    /// Stack: [..., a] -> [..., bool(a)]
    LogicToBool,

    /// Booleans are inverted; numbers map to 0 or 1 by truthiness.
    LogicNot,

    LogicAnd,
    LogicOr,

    // ========================================================================
    // Calls
    // ========================================================================
    Call(CallTarget),

    /// Return to the address saved by the matching `Call`.
    /// Stack: [..., frame, result] -> [..., result]
    Return,

    // ========================================================================
    // Triggers and waiting
    // ========================================================================
    /// Register the trigger at the popped address; `wait` also suspends the
    /// mainline until something runs `EndWait`.
    AddTrigger { wait: bool },

    RemoveTrigger,

    /// Stack: [..., seconds] -> [...]
    Wait,

    EndWait,
}

/// What a `Call` instruction invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallTarget {
    /// Statement built-ins with a fixed literal name.
    Builtin(Builtin),
    /// Expression calls (`sin(x)`), looked up in the function registry.
    Function(EcoString),
    /// Indirect call through a lock pointer cell (`throttle*`).
    Pointer(EcoString),
}

macro_rules! builtins {
    ($($variant:ident => $literal:literal),* $(,)?) => {
        /// Built-ins emitted by statements. Each maps to one literal call
        /// name, which is also its key in the function registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Builtin {
            $($variant,)*
        }

        impl Builtin {
            pub const ALL: &'static [Builtin] = &[$(Builtin::$variant,)*];

            /// The call literal, e.g. `print()`.
            pub fn literal(self) -> &'static str {
                match self {
                    $(Builtin::$variant => $literal,)*
                }
            }

            pub fn from_literal(literal: &str) -> Option<Builtin> {
                match literal {
                    $($literal => Some(Builtin::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

builtins! {
    Print => "print()",
    PrintAt => "printat()",
    Stage => "stage()",
    Add => "add()",
    Remove => "remove()",
    ClearScreen => "clearscreen()",
    Run => "run()",
    Switch => "switch()",
    Copy => "copy()",
    Rename => "rename()",
    Delete => "delete()",
    List => "list()",
    Log => "log()",
    Reboot => "reboot()",
    Shutdown => "shutdown()",
    ToggleFlyByWire => "toggleflybywire()",
    Unset => "unset()",
}

impl Builtin {
    /// Registry key: the literal without the call parentheses.
    pub fn name(self) -> &'static str {
        self.literal().trim_end_matches("()")
    }
}

impl CallTarget {
    /// Name the function registry knows the target by.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            CallTarget::Builtin(b) => Some(b.name()),
            CallTarget::Function(name) => Some(name.trim_end_matches("()")),
            CallTarget::Pointer(_) => None,
        }
    }
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallTarget::Builtin(b) => write!(f, "{}", b.literal()),
            CallTarget::Function(name) => write!(f, "{}", name),
            CallTarget::Pointer(name) => write!(f, "${}", name),
        }
    }
}

/// One instruction plus the bookkeeping the compiler and linker attach.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Opcode {
    pub instruction: Instruction,
    /// Symbolic position of this opcode. `None` only for linker scaffolding.
    pub label: Option<Label>,
    /// Symbolic branch, call or push destination.
    pub destination: Option<Label>,
    /// Address of `destination`, filled in by the linker.
    pub target: Option<usize>,
    /// Compile group this opcode came from.
    pub instruction_id: u32,
}

impl Opcode {
    pub fn new(instruction: Instruction) -> Self {
        Self {
            instruction,
            label: None,
            destination: None,
            target: None,
            instruction_id: 0,
        }
    }

    pub fn with_destination(instruction: Instruction, destination: Label) -> Self {
        Self {
            destination: Some(destination),
            ..Self::new(instruction)
        }
    }
}

impl From<Instruction> for Opcode {
    fn from(instruction: Instruction) -> Self {
        Opcode::new(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "push {:?}", value),
            Instruction::Store => write!(f, "store"),
            Instruction::Dup => write!(f, "dup"),
            Instruction::Swap => write!(f, "swap"),
            Instruction::GetMember => write!(f, "getmember"),
            Instruction::SetMember => write!(f, "setmember"),
            Instruction::Eof => write!(f, "EOF"),
            Instruction::Eop => write!(f, "EOP"),
            Instruction::Nop => write!(f, "nop"),
            Instruction::BranchIfFalse => write!(f, "br.false"),
            Instruction::Jump => write!(f, "jump"),
            Instruction::CompareGt => write!(f, "gt"),
            Instruction::CompareLt => write!(f, "lt"),
            Instruction::CompareGte => write!(f, "gte"),
            Instruction::CompareLte => write!(f, "lte"),
            Instruction::CompareEqual => write!(f, "eq"),
            Instruction::CompareNotEqual => write!(f, "ne"),
            Instruction::Add => write!(f, "add"),
            Instruction::Subtract => write!(f, "sub"),
            Instruction::Multiply => write!(f, "mult"),
            Instruction::Divide => write!(f, "div"),
            Instruction::Power => write!(f, "pow"),
            Instruction::LogicToBool => write!(f, "bool"),
            Instruction::LogicNot => write!(f, "not"),
            Instruction::LogicAnd => write!(f, "and"),
            Instruction::LogicOr => write!(f, "or"),
            Instruction::Call(target) => write!(f, "call {}", target),
            Instruction::Return => write!(f, "return"),
            Instruction::AddTrigger { wait } => write!(f, "addtrigger {}", wait),
            Instruction::RemoveTrigger => write!(f, "removetrigger"),
            Instruction::Wait => write!(f, "wait"),
            Instruction::EndWait => write!(f, "endwait"),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "{}: {}", label, self.instruction)?,
            None => write!(f, "{:7}: {}", "", self.instruction)?,
        }
        match (self.destination, self.target) {
            (Some(dest), Some(target)) => write!(f, " -> {} @{:04}", dest, target),
            (Some(dest), None) => write!(f, " -> {}", dest),
            (None, _) => Ok(()),
        }
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
