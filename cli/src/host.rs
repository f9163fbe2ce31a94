use std::io::Write;

use kerbo::Host;
use nu_ansi_term::{Color, Style};
use tracing::debug;

/// Host backed by the terminal the CLI runs in.
///
/// There is no vessel behind it: flight control changes are only logged.
#[derive(Debug, Default)]
pub struct TerminalHost {
    bound: Vec<String>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for TerminalHost {
    fn print(&mut self, text: &str) {
        println!("{}", text);
    }

    fn print_at(&mut self, text: &str, column: i32, line: i32) {
        // ANSI positions are 1-based.
        let mut stdout = std::io::stdout();
        let _ = write!(
            stdout,
            "\x1b[s\x1b[{};{}H{}\x1b[u",
            line.max(0) + 1,
            column.max(0) + 1,
            text
        );
        let _ = stdout.flush();
    }

    fn clear_screen(&mut self) {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\x1b[2J\x1b[H");
        let _ = stdout.flush();
    }

    fn toggle_fly_by_wire(&mut self, channel: &str, enabled: bool) {
        debug!(channel, enabled, "fly-by-wire");
        self.bound.retain(|name| name != channel);
        if enabled {
            self.bound.push(channel.to_string());
        }
    }

    fn set_input_lock(&mut self, locked: bool) {
        debug!(locked, "input lock");
    }

    fn unbind_all(&mut self) {
        if !self.bound.is_empty() {
            debug!(channels = ?self.bound, "releasing controls");
        }
        self.bound.clear();
    }

    fn stage(&mut self) {
        println!("{}", Style::new().bold().fg(Color::Yellow).paint("Staging."));
    }
}
