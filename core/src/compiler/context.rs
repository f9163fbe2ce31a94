use super::{Label, LockCollection, TriggerCollection};

/// State that survives across compiles of one session.
///
/// The interactive interpreter compiles every line into the same context,
/// so labels keep increasing and locks and triggers defined earlier stay
/// visible to later lines.
#[derive(Debug, Clone, Default)]
pub struct Context {
    label_index: u32,
    instruction_id: u32,
    pub locks: LockCollection,
    pub triggers: TriggerCollection,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next label.
    pub fn next_label(&mut self) -> Label {
        self.label_index += 1;
        Label(self.label_index)
    }

    /// The label the next allocation will return.
    pub fn peek_label(&self) -> Label {
        Label(self.label_index + 1)
    }

    pub fn label_index(&self) -> u32 {
        self.label_index
    }

    pub fn instruction_id(&self) -> u32 {
        self.instruction_id
    }

    /// Start a new compile group and return its id.
    pub fn next_instruction_id(&mut self) -> u32 {
        self.instruction_id += 1;
        self.instruction_id
    }
}
