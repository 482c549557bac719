//! GameEngine - the public API for playing a game.
//!
//! Wires the player, the conversation history, the narrator and the save
//! store together. Every step returns a [`Response`] carrying text that is
//! ready to show; failures are reported through [`TurnOutcome`] instead of
//! errors, since none of them end the game.

use crate::config::GameConfig;
use crate::model::{Character, PlayerStatus};
use crate::narrator::{tool_line, ChatBackend, Narrator, NarratorError};
use crate::persist::SaveStore;
use openrouter::Message;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Prompt that opens a new story.
pub const OPENING_PROMPT: &str = "The story is initiated. Please start the story.";

/// Name and HP of a freshly seeded character.
pub const STARTING_NAME: &str = "Hero";
pub const STARTING_HP: i64 = 100;

/// In-memory game: the player and the full conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub player: Option<Character>,
    pub messages: Vec<Message>,
}

impl GameState {
    /// A game exists once there is a player.
    pub fn is_initialized(&self) -> bool {
        self.player.is_some()
    }

    pub fn clear(&mut self) {
        self.player = None;
        self.messages.clear();
    }
}

/// How an engine step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The narrator answered in prose.
    Narrated,
    /// The narrator ran out of model calls.
    Paused,
    /// No API key is configured.
    Unavailable,
    /// A model call failed.
    Failed,
    /// There is no game to act in.
    NotStarted,
}

/// Result of an engine step.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Text to show the player.
    pub narrative: String,
    pub outcome: TurnOutcome,
}

/// The game facade used by front ends.
pub struct GameEngine {
    state: GameState,
    narrator: Narrator,
    store: SaveStore,
}

impl GameEngine {
    /// Build an engine from config, talking to the configured endpoint.
    pub fn new(config: GameConfig) -> Self {
        let config = Arc::new(config);
        let store = SaveStore::new(config.save_path.clone());
        Self::with_parts(Narrator::new(config), store)
    }

    /// Build an engine with an explicit backend (e.g. a scripted one).
    pub fn with_backend(config: GameConfig, backend: Arc<dyn ChatBackend>) -> Self {
        let config = Arc::new(config);
        let store = SaveStore::new(config.save_path.clone());
        Self::with_parts(Narrator::with_backend(config, backend), store)
    }

    pub fn with_parts(narrator: Narrator, store: SaveStore) -> Self {
        info!(ai_available = narrator.is_available(), "GameEngine initialized");
        Self {
            state: GameState::default(),
            narrator,
            store,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> Option<&Character> {
        self.state.player.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    pub fn is_ai_available(&self) -> bool {
        self.narrator.is_available()
    }

    /// Reset everything, seed a fresh character and narrate the opening.
    pub async fn start_new_game(&mut self) -> Response {
        info!("Starting new game");
        self.state.clear();
        self.state.player = Some(Character::new(STARTING_NAME, STARTING_HP));

        if !self.narrator.is_available() {
            return Response {
                narrative: "Cannot start game: AI Narrator is unavailable (missing API key).\n"
                    .to_string(),
                outcome: TurnOutcome::Unavailable,
            };
        }
        self.narrate(OPENING_PROMPT).await
    }

    /// Narrate what happens after the player's action.
    pub async fn process_action(&mut self, action: &str) -> Response {
        if !self.state.is_initialized() {
            error!("Cannot process action: game state not initialized");
            return Response {
                narrative: "Error: Game not started or loaded.\n".to_string(),
                outcome: TurnOutcome::NotStarted,
            };
        }
        debug!(action, "Processing player action");
        let prompt = format!("The player chose to '{action}'. Describe what happens next.");
        self.narrate(&prompt).await
    }

    async fn narrate(&mut self, prompt: &str) -> Response {
        let GameState { player, messages } = &mut self.state;
        let Some(player) = player.as_mut() else {
            return Response {
                narrative: "Error: Game not started or loaded.\n".to_string(),
                outcome: TurnOutcome::NotStarted,
            };
        };

        match self.narrator.narrate(player, prompt, messages).await {
            Ok(narration) => Response {
                narrative: narration.narrative,
                outcome: if narration.exhausted {
                    TurnOutcome::Paused
                } else {
                    TurnOutcome::Narrated
                },
            },
            Err(NarratorError::Unavailable) => Response {
                narrative: format!("{}\n", NarratorError::Unavailable),
                outcome: TurnOutcome::Unavailable,
            },
            Err(e) => Response {
                narrative: format!("{e}\n"),
                outcome: TurnOutcome::Failed,
            },
        }
    }

    /// Replace the in-memory game with the saved one.
    ///
    /// On failure the in-memory game is cleared.
    pub async fn load_game(&mut self) -> bool {
        info!("Attempting to load game");
        match self.store.load().await {
            Some(save) => {
                self.state.player = Some(save.player);
                self.state.messages = save.messages;
                true
            }
            None => {
                warn!("Failed to load game or no save file found");
                self.state.clear();
                false
            }
        }
    }

    /// Save the current game. `false` if there is no game or saving failed.
    pub async fn save_game(&self) -> bool {
        let Some(player) = &self.state.player else {
            warn!("Cannot save game: game state not initialized");
            return false;
        };
        self.store.save(player, &self.state.messages).await
    }

    /// Status panel projection of the player.
    pub fn player_status(&self) -> Option<PlayerStatus> {
        self.state.player.as_ref().map(Character::status)
    }

    /// Text of the newest history entry, for redisplay after loading.
    pub fn last_narrative(&self) -> Option<String> {
        match self.state.messages.last()? {
            Message::Assistant { content, .. } => Some(content.clone()),
            Message::Tool { name, content, .. } => {
                let shown = serde_json::from_str::<Value>(content).ok().and_then(|result| {
                    let success = result.get("success")?.as_bool()?;
                    let message = result.get("message")?.as_str()?;
                    (success && !message.is_empty()).then(|| tool_line(message))
                });
                Some(shown.unwrap_or_else(|| format!("Tool '{name}' executed.")))
            }
            _ => None,
        }
    }
}
