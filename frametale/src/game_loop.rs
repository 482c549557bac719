//! The play loop: narrative, status panel, action prompt.

use frametale_core::{GameEngine, TurnOutcome};

use crate::console::{clear_screen, Console, Input};
use crate::typer::Typer;

/// A line typed at the action prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Status,
    Save,
    Action(String),
    Nothing,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.to_lowercase().as_str() {
            "" => Self::Nothing,
            "quit" => Self::Quit,
            "status" => Self::Status,
            "save" => Self::Save,
            _ => Self::Action(input.to_string()),
        }
    }
}

fn print_status(engine: &GameEngine) {
    println!("\n═════════════ Player Status ═════════════");
    match engine.player_status() {
        Some(status) => println!("{status}"),
        None => println!("No player."),
    }
    println!("═══════════════════════════════════════════");
}

async fn save_and_exit(engine: &GameEngine, interrupted: bool) {
    if interrupted {
        println!("\nInterrupted. Attempting to save game before exiting...");
    } else {
        println!("\nAttempting to save game before exiting...");
    }
    if engine.save_game().await {
        println!("Game saved successfully.");
    } else {
        println!("Warning: Failed to save game state.");
    }
    println!("Exiting game.");
}

/// Play until the player quits, input ends, or Ctrl+C.
///
/// `narrative` is the text shown first: the opening scene of a new game or
/// the last narration of a loaded one.
pub async fn run(engine: &mut GameEngine, console: &mut Console, typer: &Typer, narrative: String) {
    if !engine.state().is_initialized() {
        tracing::error!("Game loop started with uninitialized engine.");
        println!("Error: Game engine not ready. Cannot start loop.");
        return;
    }

    let mut narrative = narrative;
    loop {
        clear_screen();
        println!("\n═══════════════ Narrative ═══════════════\n");
        let text = narrative.trim();
        if text.is_empty() {
            println!("Couldn't get narrative.");
        } else {
            typer.type_out(text).await;
        }
        print_status(engine);

        // Read until something advances the story
        let action = loop {
            match console.prompt("\nYour action (or 'quit'): ").await {
                Input::Line(line) => match Command::parse(&line) {
                    Command::Nothing => continue,
                    Command::Status => print_status(engine),
                    Command::Save => {
                        if engine.save_game().await {
                            println!("Game saved.");
                        } else {
                            println!("Warning: Failed to save game state.");
                        }
                    }
                    Command::Quit => {
                        save_and_exit(engine, false).await;
                        return;
                    }
                    Command::Action(action) => break action,
                },
                Input::Interrupted | Input::Closed => {
                    save_and_exit(engine, true).await;
                    return;
                }
            }
        };

        clear_screen();
        println!("\nLoading...");
        tracing::debug!(action = %action, "Processing action");

        let response = engine.process_action(&action).await;
        if matches!(response.outcome, TurnOutcome::Failed | TurnOutcome::Unavailable) {
            tracing::warn!(outcome = ?response.outcome, "Action produced no narration");
        }
        narrative = response.narrative;

        if engine.save_game().await {
            tracing::info!(action = %action, "Game state saved after action");
        } else {
            tracing::warn!(action = %action, "Failed to save game state after action");
            println!("Warning: Could not save game progress after last action.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(Command::parse("  QUIT "), Command::Quit);
        assert_eq!(Command::parse("status"), Command::Status);
        assert_eq!(Command::parse("save"), Command::Save);
        assert_eq!(Command::parse("   "), Command::Nothing);
    }

    #[test]
    fn test_parse_action_keeps_case() {
        assert_eq!(
            Command::parse("  Open the Hatch "),
            Command::Action("Open the Hatch".to_string())
        );
    }
}
