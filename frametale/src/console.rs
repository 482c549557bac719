//! Line input that notices Ctrl+C.

use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// What a prompt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A trimmed line.
    Line(String),
    /// Ctrl+C while waiting.
    Interrupted,
    /// Stdin reached EOF or failed.
    Closed,
}

pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `prompt` and wait for a line or Ctrl+C.
    pub async fn prompt(&mut self, prompt: &str) -> Input {
        print!("{prompt}");
        let _ = io::stdout().flush();

        tokio::select! {
            line = self.lines.next_line() => match line {
                Ok(Some(line)) => Input::Line(line.trim().to_string()),
                Ok(None) => Input::Closed,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read input");
                    Input::Closed
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                Input::Interrupted
            }
        }
    }
}

/// Clear the terminal and move the cursor home.
pub fn clear_screen() {
    print!("\x1B[2J\x1B[H");
    let _ = io::stdout().flush();
}
