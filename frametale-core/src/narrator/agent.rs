//! The narrator turn loop.
//!
//! One call to [`Narrator::narrate`] is one turn: prepare the history, maybe
//! compact it, then alternate between model calls and tool dispatch until
//! the model answers in prose or the call budget runs out.

use super::backend::ChatBackend;
use super::compactor::{self, CompactionPolicy};
use super::history::{player_state_message, prepare, reminder_message};
use crate::config::GameConfig;
use crate::model::Character;
use crate::tools::ToolRegistry;
use openrouter::{Message, OpenRouter, Request, ToolChoice};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Shown when the call budget ran out without a usable reply.
pub const PAUSED_NOTICE: &str =
    ">> The story seems paused after complex actions. Please provide your next action.\n";

/// Errors from a narrator turn.
#[derive(Debug, Error)]
pub enum NarratorError {
    /// No API key is configured. The history was not touched.
    #[error("AI Narrator is unavailable due to missing API key.")]
    Unavailable,

    /// A model call failed. Everything appended before the failing call
    /// stays in the history.
    #[error("Error communicating with AI Narrator: {0}")]
    Backend(#[from] openrouter::Error),
}

/// The result of one narrator turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Narration {
    /// Tool lines followed by the model's prose.
    pub narrative: String,

    /// Messages of the tools that applied this turn, in call order.
    pub tool_messages: Vec<String>,

    /// Narration model calls made (summarization not included).
    pub model_calls: usize,

    /// Whether old history was summarized before the first call.
    pub compacted: bool,

    /// Whether the turn ended by running out of model calls.
    pub exhausted: bool,
}

/// Drives the model through one turn at a time.
pub struct Narrator {
    backend: Option<Arc<dyn ChatBackend>>,
    config: Arc<GameConfig>,
    tools: ToolRegistry,
    policy: CompactionPolicy,
}

impl Narrator {
    /// Build a narrator talking to the configured endpoint.
    ///
    /// Without an API key the narrator is unavailable and every turn fails
    /// with [`NarratorError::Unavailable`].
    pub fn new(config: Arc<GameConfig>) -> Self {
        let backend = config.api_key.as_ref().map(|key| {
            let client = OpenRouter::new(key.clone())
                .with_base_url(config.api_base_url())
                .with_model(config.narration_model.clone())
                .with_timeout(config.request_timeout);
            Arc::new(client) as Arc<dyn ChatBackend>
        });
        if backend.is_none() {
            warn!("OPENROUTER_API_KEY not configured; AI Narrator will be unavailable");
        }
        Self::from_parts(config, backend)
    }

    /// Build a narrator around an explicit backend.
    pub fn with_backend(config: Arc<GameConfig>, backend: Arc<dyn ChatBackend>) -> Self {
        Self::from_parts(config, Some(backend))
    }

    fn from_parts(config: Arc<GameConfig>, backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self {
            backend,
            config,
            tools: ToolRegistry::standard(),
            policy: CompactionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CompactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Play one turn.
    ///
    /// `history` is updated in place: on success it holds the whole turn,
    /// on a backend error it holds everything appended before the failing
    /// call, and when unavailable it is untouched.
    pub async fn narrate(
        &self,
        player: &mut Character,
        prompt: &str,
        history: &mut Vec<Message>,
    ) -> Result<Narration, NarratorError> {
        let Some(backend) = self.backend.as_deref() else {
            return Err(NarratorError::Unavailable);
        };

        let mut working = prepare(history, &self.config);
        working.push(player_state_message(player));
        working.push(reminder_message(&self.config));
        working.push(Message::user(prompt));

        let mut compacted = false;
        match compactor::compact(
            backend,
            &self.config.summarization_model,
            &self.policy,
            &working,
        )
        .await
        {
            Ok(Some(summarized)) => {
                working = summarized;
                compacted = true;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Continuing without summarization"),
        }
        *history = working;

        let mut tool_messages = Vec::new();
        let max_calls = self.config.max_tool_iterations.max(1);

        for call_number in 1..=max_calls {
            debug!(call_number, messages = history.len(), "Calling narration model");

            let request = Request::new(history.clone())
                .with_model(self.config.narration_model.clone())
                .with_tools(self.tools.schemas())
                .with_tool_choice(ToolChoice::Auto);

            let response = backend.complete(request).await.map_err(|e| {
                error!(error = %e, call_number, "Narration model call failed");
                NarratorError::Backend(e)
            })?;

            if !response.has_tool_calls() {
                let content = response.content.unwrap_or_default();
                history.push(Message::assistant(content.clone()));
                return Ok(Narration {
                    narrative: compose(&tool_messages, &content),
                    tool_messages,
                    model_calls: call_number,
                    compacted,
                    exhausted: false,
                });
            }

            info!(calls = response.tool_calls.len(), "Model requested tool calls");
            history.push(Message::assistant_with_tool_calls(
                response.content.unwrap_or_default(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let result = self.tools.dispatch(player, call.name(), call.arguments());
                info!(tool = call.name(), success = result.success(), "Executed tool");
                if let (true, Some(message)) = (result.success(), result.message()) {
                    tool_messages.push(message.to_string());
                }
                history.push(Message::tool(
                    call.id.clone(),
                    call.name(),
                    result.to_json().to_string(),
                ));
            }
        }

        warn!(max_calls, "Max tool iterations reached");
        let tail = match history.last() {
            Some(Message::Assistant { content, .. }) if !content.is_empty() => content.clone(),
            _ => PAUSED_NOTICE.to_string(),
        };

        Ok(Narration {
            narrative: compose(&tool_messages, &tail),
            tool_messages,
            model_calls: max_calls,
            compacted,
            exhausted: true,
        })
    }
}

/// Format a tool message the way it is shown to the player.
pub fn tool_line(message: &str) -> String {
    format!(">> {message}\n")
}

fn compose(tool_messages: &[String], tail: &str) -> String {
    let lines: Vec<String> = tool_messages.iter().map(|m| tool_line(m)).collect();
    let mut narrative = lines.join("\n");
    narrative.push_str(tail);
    narrative
}
