//! Terminal presentation for the interactive chat loop.

use std::io::{self, IsTerminal, Write};

const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const BLUE: &str = "\x1b[94m";
const RESET: &str = "\x1b[0m";

/// Colored console output, with colors disabled when stdout is not a
/// terminal or `NO_COLOR` is set.
pub struct Console {
    color: bool,
}

impl Console {
    pub fn new() -> Self {
        let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn info(&self, text: &str) {
        println!("{}", self.paint(BLUE, text));
    }

    pub fn error(&self, text: &str) {
        eprintln!("{}", self.paint(RED, &format!("Error: {text}")));
    }

    pub fn bot_reply(&self, text: &str) {
        println!("{} {text}\n", self.paint(GREEN, "Lectern:"));
    }

    /// Print the prompt and read one trimmed line; `None` on EOF.
    pub fn read_user_input(&self) -> Option<String> {
        print!("{} ", self.paint(CYAN, "You:"));
        // the prompt lacks a newline, so push it out before blocking on stdin
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(_) => None,
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
