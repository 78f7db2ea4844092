//! Debug serial console.
//!
//! Line-buffered text commands over the UART, polled from the main loop.
//! The console is a pure sink: it echoes and logs, but never feeds back
//! into control state.
//!
//! Grammar: `<cmd> [args…]\n`. Currently only `test` is understood.

use heapless::String;
use log::info;

/// Maximum accepted line length; longer input is truncated at the tail.
const LINE_CAP: usize = 64;

pub struct Console {
    line: String<LINE_CAP>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub const fn new() -> Self {
        Self {
            line: String::new(),
        }
    }

    /// Feed one received byte. Dispatches when a line terminator arrives.
    pub fn push_byte(&mut self, byte: u8) {
        match byte {
            b'\r' => {}
            b'\n' => {
                if !self.line.is_empty() {
                    dispatch_line(self.line.as_str());
                    self.line.clear();
                }
            }
            _ => {
                // Overflow: drop the excess rather than the whole line.
                let _ = self.line.push(byte as char);
            }
        }
    }
}

fn dispatch_line(line: &str) {
    let (cmd, args) = match line.split_once(' ') {
        Some((c, a)) => (c, a),
        None => (line, ""),
    };

    match cmd {
        "test" => info!("TEST [{}]", args),
        other => info!("console: unknown command '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(console: &mut Console, text: &str) {
        for b in text.bytes() {
            console.push_byte(b);
        }
    }

    #[test]
    fn blank_lines_are_ignored() {
        let mut c = Console::new();
        feed(&mut c, "\r\n\n\r\n");
        assert!(c.line.is_empty());
    }

    #[test]
    fn carriage_return_is_stripped() {
        let mut c = Console::new();
        feed(&mut c, "test abc");
        c.push_byte(b'\r');
        assert_eq!(c.line.as_str(), "test abc");
    }

    #[test]
    fn line_resets_after_dispatch() {
        let mut c = Console::new();
        feed(&mut c, "test hello\n");
        assert!(c.line.is_empty());
        feed(&mut c, "test again\n");
        assert!(c.line.is_empty());
    }

    #[test]
    fn oversized_line_does_not_panic() {
        let mut c = Console::new();
        for _ in 0..200 {
            c.push_byte(b'x');
        }
        c.push_byte(b'\n');
        assert!(c.line.is_empty());
    }
}
