//! Save file persistence.
//!
//! A game is saved wholesale as one JSON document holding the player and
//! the full conversation history:
//!
//! ```json
//! { "player": { "name": "Hero", "hp": 100, ... }, "messages": [ ... ] }
//! ```

use crate::model::Character;
use openrouter::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid save format: missing 'player' or 'messages' (must be a list)")]
    InvalidFormat,
}

/// Everything needed to resume a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub player: Character,
    pub messages: Vec<Message>,
}

#[derive(Serialize)]
struct SaveRef<'a> {
    player: &'a Character,
    messages: &'a [Message],
}

impl SaveFile {
    /// Decode a save document, rejecting documents without a player or a
    /// message list.
    pub fn from_json(content: &str) -> Result<Self, PersistError> {
        let document: Value = serde_json::from_str(content)?;
        let player = document
            .get("player")
            .filter(|player| !player.is_null())
            .ok_or(PersistError::InvalidFormat)?;
        let messages = document
            .get("messages")
            .filter(|messages| messages.is_array())
            .ok_or(PersistError::InvalidFormat)?;

        Ok(Self {
            player: Character::deserialize(player)?,
            messages: Vec::<Message>::deserialize(messages)?,
        })
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        encode(&self.player, &self.messages)
    }
}

fn encode(player: &Character, messages: &[Message]) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(&SaveRef { player, messages })?)
}

/// A save file at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Read and validate the save file.
    pub async fn read(&self) -> Result<SaveFile, PersistError> {
        let content = fs::read_to_string(&self.path).await?;
        SaveFile::from_json(&content)
    }

    /// Write the save file, creating missing parent directories.
    pub async fn write(&self, player: &Character, messages: &[Message]) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !fs::try_exists(dir).await.unwrap_or(false) {
                fs::create_dir_all(dir).await?;
                info!(dir = %dir.display(), "Created save directory");
            }
        }
        fs::write(&self.path, encode(player, messages)?).await?;
        Ok(())
    }

    /// Load the saved game. Any failure counts as "no valid save".
    pub async fn load(&self) -> Option<SaveFile> {
        if !self.exists().await {
            info!(path = %self.path.display(), "No save file found");
            return None;
        }
        match self.read().await {
            Ok(save) => {
                info!(path = %self.path.display(), "Game state loaded");
                Some(save)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not load save file");
                None
            }
        }
    }

    /// Save the game. Failures are logged and reported as `false`.
    pub async fn save(&self, player: &Character, messages: &[Message]) -> bool {
        match self.write(player, messages).await {
            Ok(()) => {
                info!(path = %self.path.display(), "Game state saved");
                true
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Error saving game state");
                false
            }
        }
    }
}
