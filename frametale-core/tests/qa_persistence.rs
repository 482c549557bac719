//! QA tests for save/load through the game engine.
//!
//! These tests verify that a played game is saved wholesale and restored
//! exactly, and that bad save files count as "no valid save".

use frametale_core::{
    GameConfig, GameEngine, Message, SaveStore, ScriptedBackend, ScriptedReply, TurnOutcome,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn engine_at(path: &Path, replies: Vec<ScriptedReply>) -> GameEngine {
    let config = GameConfig::default().with_save_path(path);
    GameEngine::with_backend(config, Arc::new(ScriptedBackend::new(replies)))
}

// =============================================================================
// ROUND TRIP
// =============================================================================

#[tokio::test]
async fn test_save_and_load_played_game() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let save_path = temp_dir.path().join("saves").join("save.json");

    let mut engine = engine_at(
        &save_path,
        vec![
            ScriptedReply::tool(
                "call_1",
                "add_item_to_inventory",
                json!({"item_name": "Wrench", "item_description": "Heavy", "item_value": 3}),
            ),
            ScriptedReply::tool("call_2", "change_player_money", json!({"amount": 4.75})),
            ScriptedReply::text("You pocket the wrench and the coins."),
        ],
    );

    let response = engine.start_new_game().await;
    assert_eq!(response.outcome, TurnOutcome::Narrated);
    assert!(engine.save_game().await);
    assert!(save_path.exists());

    let saved_player = engine.player().cloned().unwrap();
    let saved_messages = engine.messages().to_vec();

    // A fresh engine with nothing scripted restores everything
    let mut restored = engine_at(&save_path, vec![]);
    assert!(restored.load_game().await);
    assert_eq!(restored.player(), Some(&saved_player));
    assert_eq!(restored.messages(), saved_messages.as_slice());
    assert_eq!(
        restored.last_narrative().as_deref(),
        Some("You pocket the wrench and the coins.")
    );

    let status = restored.player_status().unwrap();
    assert_eq!(status.money, "4.75 oz");
    assert_eq!(status.inventory, vec!["Wrench".to_string()]);
}

#[tokio::test]
async fn test_save_file_document_shape() {
    let temp_dir = TempDir::new().unwrap();
    let save_path = temp_dir.path().join("save.json");

    let mut engine = engine_at(&save_path, vec![ScriptedReply::text("It begins.")]);
    engine.start_new_game().await;
    assert!(engine.save_game().await);

    let content = std::fs::read_to_string(&save_path).unwrap();
    let document: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(document["player"]["name"], "Hero");
    assert_eq!(document["player"]["hp"], 100);
    assert_eq!(document["player"]["stamina"], 100);
    assert_eq!(document["player"]["money_oz"], 0.0);
    assert_eq!(document["messages"][0]["role"], "system");
    assert_eq!(document["messages"][4]["role"], "assistant");
    assert_eq!(document["messages"][4]["content"], "It begins.");
}

#[tokio::test]
async fn test_load_accepts_hand_written_save() {
    let temp_dir = TempDir::new().unwrap();
    let save_path = temp_dir.path().join("save.json");
    std::fs::write(
        &save_path,
        r#"{
            "player": {
                "name": "Kael",
                "hp": 40,
                "money_oz": 1.5,
                "inventory": [{"name": "Badge", "description": "Dented"}],
                "location": "Mid-deck"
            },
            "messages": [
                {"role": "system", "content": "setup"},
                {"role": "assistant", "content": null, "tool_calls": [
                    {"id": "c1", "type": "function",
                     "function": {"name": "change_player_hp", "arguments": "{\"amount\": -1}"}}
                ]},
                {"role": "tool", "tool_call_id": "c1", "name": "change_player_hp",
                 "content": "{\"success\": true, \"new_hp\": 40, \"message\": \"You took 1 damage!\"}"}
            ]
        }"#,
    )
    .unwrap();

    let mut engine = engine_at(&save_path, vec![]);
    assert!(engine.load_game().await);

    let player = engine.player().unwrap();
    assert_eq!(player.stamina, 100);
    assert_eq!(player.inventory[0].value, 0);
    assert_eq!(engine.messages()[1].content(), "");
    assert_eq!(
        engine.last_narrative().as_deref(),
        Some(">> You took 1 damage!\n")
    );
}

// =============================================================================
// FAILURES
// =============================================================================

#[tokio::test]
async fn test_load_without_save_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = engine_at(&temp_dir.path().join("missing.json"), vec![]);
    assert!(!engine.load_game().await);
    assert!(!engine.state().is_initialized());
}

#[tokio::test]
async fn test_failed_load_clears_current_game() {
    let temp_dir = TempDir::new().unwrap();
    let save_path = temp_dir.path().join("save.json");
    std::fs::write(&save_path, r#"{"player": {"name": "Kael", "hp": 1}, "messages": "oops"}"#)
        .unwrap();

    let mut engine = engine_at(&save_path, vec![ScriptedReply::text("It begins.")]);
    engine.start_new_game().await;
    assert!(engine.state().is_initialized());

    assert!(!engine.load_game().await);
    assert!(!engine.state().is_initialized());
    assert!(engine.messages().is_empty());
}

#[tokio::test]
async fn test_store_rejects_invalid_documents() {
    let temp_dir = TempDir::new().unwrap();
    let store = SaveStore::new(temp_dir.path().join("save.json"));

    for content in [
        "",
        "[]",
        r#"{"player": {"name": "Kael", "hp": 1}}"#,
        r#"{"messages": []}"#,
        r#"{"player": {"name": "Kael", "hp": 1}, "messages": [{"role": "narrator"}]}"#,
    ] {
        std::fs::write(store.path(), content).unwrap();
        assert!(store.load().await.is_none(), "accepted {content:?}");
    }
}

#[tokio::test]
async fn test_save_before_start_fails() {
    let temp_dir = TempDir::new().unwrap();
    let save_path = temp_dir.path().join("save.json");
    let engine = engine_at(&save_path, vec![]);

    assert!(!engine.save_game().await);
    assert!(!save_path.exists());
}

#[tokio::test]
async fn test_save_to_unwritable_path_reports_failure() {
    let temp_dir = TempDir::new().unwrap();
    // A file where the parent directory should be
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut engine = engine_at(&blocker.join("save.json"), vec![ScriptedReply::text("Go.")]);
    engine.start_new_game().await;
    assert!(!engine.save_game().await);
}

#[tokio::test]
async fn test_empty_history_is_a_valid_save() {
    let temp_dir = TempDir::new().unwrap();
    let save_path = temp_dir.path().join("save.json");

    // Without an API key the game starts with a character but no history
    let config = GameConfig::default().with_save_path(&save_path);
    let mut engine = GameEngine::new(config.clone());
    engine.start_new_game().await;
    assert!(engine.save_game().await);

    let mut restored = GameEngine::new(config);
    assert!(restored.load_game().await);
    assert_eq!(restored.messages(), &[] as &[Message]);
    assert_eq!(restored.player().unwrap().name, "Hero");
}
