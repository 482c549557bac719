//! FrameTale terminal game.
//!
//! A line-oriented front end for the narrator engine: a main menu, the
//! narrative typed out character by character, and a status panel.
//!
//! ```bash
//! cargo run -p frametale -- --save-file saves/mine.json --no-typing
//! ```
//!
//! Logs go to `logs/latest.log` so they never interleave with the game screen.

mod console;
mod game_loop;
mod menu;
mod typer;

use anyhow::Context;
use clap::Parser;
use frametale_core::{GameConfig, GameEngine};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use console::Console;
use menu::MenuChoice;
use typer::Typer;

#[derive(Parser)]
#[command(
    name = "frametale",
    about = "FrameTale - interactive fiction with an AI narrator",
    version
)]
struct Cli {
    /// Where the game is saved and loaded
    #[arg(long, env = "SAVE_FILE_PATH")]
    save_file: Option<PathBuf>,

    /// Log file, truncated on every run
    #[arg(long, default_value = "logs/latest.log")]
    log_file: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "debug")]
    log_level: String,

    /// Print the narrative at once instead of typing it out
    #[arg(long)]
    no_typing: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap so env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_file, &cli.log_level)?;
    tracing::info!("Initialized logger.");

    let mut config = GameConfig::from_env().context("Invalid configuration")?;
    if let Some(path) = cli.save_file {
        config = config.with_save_path(path);
    }
    if !config.is_ai_available() {
        tracing::warn!("OPENROUTER_API_KEY is not set, the narrator is disabled");
    }

    let mut engine = GameEngine::new(config);
    let mut console = Console::new();
    let typer = Typer::new(!cli.no_typing);

    match menu::choose(&mut console).await {
        Some(MenuChoice::NewGame) => {
            tracing::info!("Starting new game...");
            println!("\nLoading...");
            let response = engine.start_new_game().await;

            if engine.save_game().await {
                tracing::debug!("Saved game state after initial narrative.");
            } else {
                tracing::warn!("Failed to save initial game state.");
            }

            if engine.state().is_initialized() {
                game_loop::run(&mut engine, &mut console, &typer, response.narrative).await;
            } else {
                tracing::error!("Engine state not initialized after start_new_game.");
                println!("Failed to initialize new game state.");
            }
        }
        Some(MenuChoice::Continue) => {
            tracing::info!("Attempting to continue game...");
            if engine.load_game().await {
                tracing::info!("Loaded game state successfully.");
                let narrative = engine.last_narrative().unwrap_or_default();
                game_loop::run(&mut engine, &mut console, &typer, narrative).await;
            } else {
                tracing::warn!("Could not load game. No save file found or file is invalid.");
                println!("\nNo game save available.");
            }
        }
        Some(MenuChoice::Exit) | None => {
            println!("Exiting game. Goodbye!");
        }
    }

    Ok(())
}

/// Install a file-backed `tracing` subscriber.
fn init_logging(path: &Path, filter: &str) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
