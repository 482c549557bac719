//! Integration tests that call the real chat API.
//!
//! These tests require OPENROUTER_API_KEY to be set (via .env file or environment).
//! Run with: `cargo test -p frametale-core --test api_integration -- --ignored`
//!
//! These are marked #[ignore] by default to avoid:
//! - API costs in CI
//! - Test failures when no API key is available
//! - Slow test runs (API calls take seconds)

use frametale_core::{GameConfig, GameEngine, TurnOutcome};
use tempfile::TempDir;

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if API key is available
fn has_api_key() -> bool {
    std::env::var("OPENROUTER_API_KEY").is_ok()
}

fn engine(temp_dir: &TempDir) -> GameEngine {
    let config = GameConfig::from_env()
        .expect("Invalid configuration")
        .with_save_path(temp_dir.path().join("save.json"));
    GameEngine::new(config)
}

#[tokio::test]
#[ignore] // Run with: cargo test -p frametale-core --test api_integration -- --ignored
async fn test_opening_narration() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: OPENROUTER_API_KEY not set");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let mut engine = engine(&temp_dir);

    let response = engine.start_new_game().await;
    println!("Opening:\n{}", response.narrative);

    assert!(matches!(
        response.outcome,
        TurnOutcome::Narrated | TurnOutcome::Paused
    ));
    assert!(!response.narrative.trim().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_picking_something_up_uses_inventory_tool() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: OPENROUTER_API_KEY not set");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let mut engine = engine(&temp_dir);
    engine.start_new_game().await;

    let response = engine
        .process_action("pick up the wrench lying on the workbench and put it in my bag")
        .await;
    println!("Narrative:\n{}", response.narrative);

    let inventory = engine.player_status().unwrap().inventory;
    println!("Inventory: {inventory:?}");
    assert!(
        inventory.iter().any(|name| name.to_lowercase().contains("wrench")),
        "The model should have added the wrench to the inventory"
    );

    assert!(engine.save_game().await);
}
