//! Typed-text animation for the narrative.
//!
//! Characters are printed one at a time with a pause that depends on the
//! character, so sentences land the way a storyteller would read them.
//! Ctrl+C prints the rest at once; the animation never touches game state.

use colored::Colorize;
use rand::Rng;
use std::io::{self, Write};
use std::time::Duration;

/// Prefix of the lines that report tool effects.
const TOOL_LINE_PREFIX: &str = ">> ";

/// Pause after printing `ch`.
pub fn delay_for<R: Rng + ?Sized>(ch: char, rng: &mut R) -> Duration {
    match ch {
        '\n' => Duration::from_millis(500),
        '.' | '!' | '?' => Duration::from_millis(300),
        ',' => Duration::from_millis(100),
        ' ' => Duration::from_millis(10),
        _ => Duration::from_millis(rng.gen_range(10..=50)),
    }
}

fn is_tool_line(line: &str) -> bool {
    line.starts_with(TOOL_LINE_PREFIX)
}

fn print_piece(piece: &str, tool_line: bool) {
    if piece.is_empty() {
        return;
    }
    if tool_line {
        print!("{}", piece.bright_cyan());
    } else {
        print!("{piece}");
    }
}

pub struct Typer {
    enabled: bool,
}

impl Typer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Print `text` followed by a newline.
    pub async fn type_out(&self, text: &str) {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();

        if !self.enabled {
            for line in &lines {
                print_piece(line, is_tool_line(line));
            }
            println!();
            return;
        }

        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        for (index, line) in lines.iter().enumerate() {
            let tool_line = is_tool_line(line);
            for (offset, ch) in line.char_indices() {
                let end = offset + ch.len_utf8();
                print_piece(&line[offset..end], tool_line);
                let _ = io::stdout().flush();

                let delay = delay_for(ch, &mut rand::thread_rng());
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = &mut interrupt => {
                        tracing::info!("Typing interrupted, printing the rest");
                        print_piece(&line[end..], tool_line);
                        for rest in &lines[index + 1..] {
                            print_piece(rest, is_tool_line(rest));
                        }
                        println!();
                        return;
                    }
                }
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_delays() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(delay_for('\n', &mut rng), Duration::from_millis(500));
        assert_eq!(delay_for('.', &mut rng), Duration::from_millis(300));
        assert_eq!(delay_for('!', &mut rng), Duration::from_millis(300));
        assert_eq!(delay_for('?', &mut rng), Duration::from_millis(300));
        assert_eq!(delay_for(',', &mut rng), Duration::from_millis(100));
        assert_eq!(delay_for(' ', &mut rng), Duration::from_millis(10));
    }

    #[test]
    fn test_letter_delay_is_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        for ch in "The deck hums beneath your boots".chars().filter(|c| c.is_alphabetic()) {
            let delay = delay_for(ch, &mut rng);
            assert!(delay >= Duration::from_millis(10), "{delay:?}");
            assert!(delay <= Duration::from_millis(50), "{delay:?}");
        }
    }

    #[test]
    fn test_tool_lines() {
        assert!(is_tool_line(">> You took 5 damage!\n"));
        assert!(!is_tool_line("You took 5 damage!"));
        assert!(!is_tool_line(">>no space"));
    }
}
