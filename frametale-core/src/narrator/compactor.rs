//! History compaction.
//!
//! When the dialogue grows past a threshold, the oldest turns are sent to a
//! (usually cheaper) model for a terse fact list, and replaced by a single
//! `Summary:` system message. Planning and applying a compaction are pure;
//! only [`compact`] talks to the backend.

use super::backend::ChatBackend;
use openrouter::{Message, Request, Role};
use thiserror::Error;
use tracing::{debug, info};

const SUMMARY_INSTRUCTIONS: &str = include_str!("prompts/summary.txt");

/// Errors from a compaction attempt. All of them are soft for the caller.
#[derive(Debug, Error)]
pub enum CompactionError {
    #[error("Summarization request failed: {0}")]
    Backend(#[from] openrouter::Error),

    #[error("Summarization returned no text")]
    EmptySummary,
}

/// When and how much history to compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionPolicy {
    /// Compact once the user/assistant message count exceeds this.
    pub threshold: usize,

    /// User/assistant messages replaced by the summary.
    pub chunk: usize,

    /// Extra messages shown to the summarizer as context but kept.
    pub overlap: usize,
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self {
            threshold: 10,
            chunk: 5,
            overlap: 2,
        }
    }
}

/// The messages one compaction reads and removes, as history indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionPlan {
    /// Oldest `chunk + overlap` user/assistant messages.
    pub sampled: Vec<usize>,

    /// Oldest `chunk` user/assistant messages.
    pub removed: Vec<usize>,
}

impl CompactionPolicy {
    /// Plan a compaction, or `None` if the history is still short enough.
    pub fn plan(&self, history: &[Message]) -> Option<CompactionPlan> {
        let dialogue: Vec<usize> = history
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_dialogue())
            .map(|(i, _)| i)
            .collect();

        if dialogue.len() <= self.threshold || self.chunk == 0 {
            return None;
        }

        let sampled: Vec<usize> = dialogue
            .iter()
            .copied()
            .take(self.chunk + self.overlap)
            .collect();
        let removed = dialogue.iter().copied().take(self.chunk).collect();
        Some(CompactionPlan { sampled, removed })
    }
}

/// The summarization prompt: fixed instructions, then one line per sampled
/// message.
pub fn transcript_prompt(history: &[Message], plan: &CompactionPlan) -> String {
    let mut prompt = SUMMARY_INSTRUCTIONS.trim_end().to_string();
    prompt.push_str("\n\n");
    for message in plan.sampled.iter().filter_map(|&i| history.get(i)) {
        let speaker = match message.role() {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
            Role::Tool => "Tool",
        };
        prompt.push_str(&format!("{}: {}\n", speaker, message.content()));
    }
    prompt
}

/// Replace the planned messages with one summary message placed where the
/// first removed message was.
pub fn apply(history: &[Message], plan: &CompactionPlan, summary: &str) -> Vec<Message> {
    let Some(&first) = plan.removed.first() else {
        return history.to_vec();
    };

    let mut compacted = Vec::with_capacity(history.len() + 1 - plan.removed.len());
    for (index, message) in history.iter().enumerate() {
        if index == first {
            compacted.push(Message::system(format!("Summary: {}", summary.trim())));
        }
        if !plan.removed.contains(&index) {
            compacted.push(message.clone());
        }
    }
    compacted
}

/// Summarize the oldest dialogue if the policy says so.
///
/// Returns `Ok(None)` when no compaction was needed. On error the caller's
/// history is untouched, since this never mutates its input.
pub async fn compact(
    backend: &dyn ChatBackend,
    model: &str,
    policy: &CompactionPolicy,
    history: &[Message],
) -> Result<Option<Vec<Message>>, CompactionError> {
    let Some(plan) = policy.plan(history) else {
        return Ok(None);
    };

    debug!(
        sampled = plan.sampled.len(),
        removed = plan.removed.len(),
        model,
        "Requesting history summary"
    );

    let request = Request::new(vec![Message::user(transcript_prompt(history, &plan))])
        .with_model(model);
    let response = backend.complete(request).await?;

    let summary = response.content.unwrap_or_default();
    if summary.trim().is_empty() {
        return Err(CompactionError::EmptySummary);
    }

    info!(
        removed = plan.removed.len(),
        "Summarized oldest user/assistant messages"
    );
    Ok(Some(apply(history, &plan, &summary)))
}
