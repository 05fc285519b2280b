//! Terminal title handling

use std::io::{IsTerminal, Write};

/// Sets the terminal title when stdout is a terminal
///
/// Write failures are ignored.
pub fn set_terminal_title(title: &str) {
    let mut stdout = std::io::stdout();
    if !stdout.is_terminal() {
        return;
    }
    // ANSI escape sequence to set terminal title
    let _ = write!(stdout, "\x1b]0;{title}\x07").and_then(|_| stdout.flush());
}
