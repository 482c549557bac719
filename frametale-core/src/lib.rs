//! Interactive fiction engine with an AI narrator.
//!
//! This crate provides:
//! - A player model (HP, stamina, money, inventory) mutated only by tools
//! - Narrator tools the model calls by name, with derived JSON schemas
//! - The narrator turn loop with history retention and summarization
//! - Whole-game save files
//!
//! # Quick Start
//!
//! ```ignore
//! use frametale_core::{GameConfig, GameEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut engine = GameEngine::new(GameConfig::from_env().unwrap_or_default());
//!
//!     let response = engine.start_new_game().await;
//!     println!("{}", response.narrative);
//!
//!     let response = engine.process_action("I look around the workshop").await;
//!     println!("{}", response.narrative);
//!
//!     engine.save_game().await;
//! }
//! ```

pub mod config;
pub mod engine;
pub mod model;
pub mod narrator;
pub mod persist;
pub mod testing;
pub mod tools;

// Re-export for convenience
pub use frametale_macros::Tool;
pub use openrouter::Message;

// Primary public API
pub use config::{ConfigError, GameConfig};
pub use engine::{GameEngine, GameState, Response, TurnOutcome};
pub use model::{Character, Item, PlayerStatus};
pub use narrator::{ChatBackend, CompactionPolicy, Narration, Narrator, NarratorError};
pub use persist::{PersistError, SaveFile, SaveStore};
pub use testing::{ScriptedBackend, ScriptedReply};
pub use tools::{ToolRegistry, ToolResult};
