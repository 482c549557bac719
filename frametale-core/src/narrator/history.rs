//! Conversation history shaping.
//!
//! Pure functions over a message list: seeding the story setup message,
//! capping how many system messages survive, and the per-turn system
//! messages that describe the player.

use crate::config::GameConfig;
use crate::model::Character;
use openrouter::Message;

/// How many system messages survive retention.
pub const SYSTEM_MESSAGES_KEPT: usize = 2;

const DUNGEON_MASTER: &str = include_str!("prompts/dungeon_master.txt");
const DEBUG_MODE: &str = include_str!("prompts/debug_mode.txt");
const CLOSING: &str = include_str!("prompts/closing.txt");

/// The story setup message that opens every conversation.
pub fn setup_message(config: &GameConfig) -> Message {
    let mut content = DUNGEON_MASTER.trim().to_string();
    if let Some(password) = &config.debug_password {
        content.push(' ');
        content.push_str(&DEBUG_MODE.trim().replace("{debug_password}", password));
    }
    content.push_str(&format!(" The story is {}. ", config.story.trim()));
    content.push_str(CLOSING.trim());
    Message::system(content)
}

/// Compact description of the player, sent as a system message every turn.
pub fn player_state_message(player: &Character) -> Message {
    Message::system(player.state_summary())
}

/// Tool usage reminder sent right before the player's prompt.
pub fn reminder_message(config: &GameConfig) -> Message {
    Message::system(config.reminder.clone())
}

/// Keep only the `keep` most recent system messages.
///
/// Every other message survives, and all survivors keep their original
/// relative order. Each turn appends two system messages, so a summary
/// inserted by compaction is gone by the following turn.
pub fn retain_system_messages(history: Vec<Message>, keep: usize) -> Vec<Message> {
    let total = history.iter().filter(|m| m.is_system()).count();
    let mut to_drop = total.saturating_sub(keep);
    history
        .into_iter()
        .filter(|message| {
            if message.is_system() && to_drop > 0 {
                to_drop -= 1;
                false
            } else {
                true
            }
        })
        .collect()
}

/// Seed the setup message if the history has no system message yet, then
/// apply system message retention.
pub fn prepare(history: &[Message], config: &GameConfig) -> Vec<Message> {
    let mut prepared = history.to_vec();
    if !prepared.iter().any(Message::is_system) {
        prepared.insert(0, setup_message(config));
    }
    retain_system_messages(prepared, SYSTEM_MESSAGES_KEPT)
}

/// Number of user and assistant messages.
pub fn dialogue_count(history: &[Message]) -> usize {
    history.iter().filter(|m| m.is_dialogue()).count()
}
