use core::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

/// What the CPU needs from the simulation around it.
///
/// Every method has a no-op default so embedders only implement what they
/// support.
pub trait Host {
    fn print(&mut self, _text: &str) {}

    fn print_at(&mut self, _text: &str, _column: i32, _line: i32) {}

    fn clear_screen(&mut self) {}

    /// Hand a flight control channel (`throttle`, `steering`, ...) to the
    /// script or give it back.
    fn toggle_fly_by_wire(&mut self, _channel: &str, _enabled: bool) {}

    /// Block interactive input while a program runs.
    fn set_input_lock(&mut self, _locked: bool) {}

    /// Release every control the script holds.
    fn unbind_all(&mut self) {}

    fn stage(&mut self) {}
}

/// Host that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}

#[derive(Debug, Default)]
struct BufferState {
    lines: Vec<String>,
    fly_by_wire: HashMap<String, bool>,
    input_locked: bool,
    unbind_count: usize,
    stage_count: usize,
}

/// A host that records everything in memory.
///
/// Clones share the same buffer, so a test can keep one handle and give
/// the other to the CPU.
///
/// # Example
///
/// ```
/// use kerbo_core::vm::{BufferHost, Host};
///
/// let host = BufferHost::new();
/// let mut handle = host.clone();
/// handle.print("hello");
/// assert_eq!(host.lines(), vec!["hello".to_string()]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct BufferHost {
    state: Rc<RefCell<BufferState>>,
}

impl BufferHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Printed lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.state.borrow().lines.clone()
    }

    /// All output joined with newlines.
    pub fn output(&self) -> String {
        self.state.borrow().lines.join("\n")
    }

    pub fn take_lines(&self) -> Vec<String> {
        core::mem::take(&mut self.state.borrow_mut().lines)
    }

    /// Last state set for `channel`, if it was ever toggled.
    pub fn fly_by_wire(&self, channel: &str) -> Option<bool> {
        self.state.borrow().fly_by_wire.get(channel).copied()
    }

    pub fn input_locked(&self) -> bool {
        self.state.borrow().input_locked
    }

    pub fn unbind_count(&self) -> usize {
        self.state.borrow().unbind_count
    }

    pub fn stage_count(&self) -> usize {
        self.state.borrow().stage_count
    }
}

impl Host for BufferHost {
    fn print(&mut self, text: &str) {
        self.state.borrow_mut().lines.push(text.to_string());
    }

    fn print_at(&mut self, text: &str, column: i32, line: i32) {
        self.state
            .borrow_mut()
            .lines
            .push(format!("[{},{}] {}", column, line, text));
    }

    fn clear_screen(&mut self) {
        self.state.borrow_mut().lines.clear();
    }

    fn toggle_fly_by_wire(&mut self, channel: &str, enabled: bool) {
        self.state
            .borrow_mut()
            .fly_by_wire
            .insert(channel.to_string(), enabled);
    }

    fn set_input_lock(&mut self, locked: bool) {
        self.state.borrow_mut().input_locked = locked;
    }

    fn unbind_all(&mut self) {
        self.state.borrow_mut().unbind_count += 1;
    }

    fn stage(&mut self) {
        self.state.borrow_mut().stage_count += 1;
    }
}
