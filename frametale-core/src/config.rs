//! Game configuration.
//!
//! A [`GameConfig`] is built once at startup and shared read-only with the
//! engine and narrator. Nothing in the library reads the environment on its
//! own; [`GameConfig::from_env`] is the single place that does.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default chat completions endpoint.
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for both narration and summarization.
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

/// Model calls allowed per turn.
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 5;

/// Default location of the save file.
pub const DEFAULT_SAVE_PATH: &str = "saves/save.json";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const STORY: &str = include_str!("narrator/prompts/story.txt");
const REMINDER: &str = include_str!("narrator/prompts/reminder.txt");

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Configuration shared by the engine and the narrator.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Bearer token for the chat API. `None` disables the narrator.
    pub api_key: Option<String>,

    /// Full chat completions URL or an API base ending in `/v1`.
    pub api_url: String,

    /// Model used for the story itself.
    pub narration_model: String,

    /// Model used to summarize old history.
    pub summarization_model: String,

    /// Model calls allowed per turn.
    pub max_tool_iterations: usize,

    /// Overall timeout for one model call. `None` waits forever.
    pub request_timeout: Option<Duration>,

    /// Password that lets the player put the narrator in debug mode.
    pub debug_password: Option<String>,

    /// Story outline given to the narrator at the start of every session.
    pub story: String,

    /// Tool usage reminder sent before every player prompt.
    pub reminder: String,

    /// Where the game is saved.
    pub save_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            narration_model: DEFAULT_MODEL.to_string(),
            summarization_model: DEFAULT_MODEL.to_string(),
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            debug_password: None,
            story: STORY.trim().to_string(),
            reminder: REMINDER.trim().to_string(),
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
        }
    }
}

impl GameConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Blank values count as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        config.api_key = get("OPENROUTER_API_KEY");
        if let Some(url) = get("OPENROUTER_API_URL") {
            config.api_url = url;
        }
        if let Some(model) = get("FRAMETALE_NARRATION_MODEL") {
            config.narration_model = model;
        }
        if let Some(model) = get("FRAMETALE_SUMMARIZATION_MODEL") {
            config.summarization_model = model;
        }
        if let Some(raw) = get("FRAMETALE_MAX_TOOL_ITERATIONS") {
            config.max_tool_iterations = match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "FRAMETALE_MAX_TOOL_ITERATIONS",
                        value: raw,
                    })
                }
            };
        }
        if let Some(raw) = get("FRAMETALE_REQUEST_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "FRAMETALE_REQUEST_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        config.debug_password = get("FRAMETALE_DEBUG_PASSWORD");
        if let Some(path) = get("SAVE_FILE_PATH") {
            config.save_path = PathBuf::from(path);
        }
        Ok(config)
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Remove the API key, disabling the narrator.
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_narration_model(mut self, model: impl Into<String>) -> Self {
        self.narration_model = model.into();
        self
    }

    pub fn with_summarization_model(mut self, model: impl Into<String>) -> Self {
        self.summarization_model = model.into();
        self
    }

    /// Set the per-turn model call budget (at least one call).
    pub fn with_max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = n.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_debug_password(mut self, password: impl Into<String>) -> Self {
        self.debug_password = Some(password.into());
        self
    }

    pub fn with_story(mut self, story: impl Into<String>) -> Self {
        self.story = story.into();
        self
    }

    pub fn with_reminder(mut self, reminder: impl Into<String>) -> Self {
        self.reminder = reminder.into();
        self
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = path.into();
        self
    }

    /// Whether a narrator can be built from this config.
    pub fn is_ai_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// API base URL (without `/chat/completions`) for the HTTP client.
    pub fn api_base_url(&self) -> &str {
        let url = self.api_url.trim_end_matches('/');
        url.strip_suffix("/chat/completions").unwrap_or(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.max_tool_iterations, 5);
        assert_eq!(config.narration_model, DEFAULT_MODEL);
        assert_eq!(config.save_path, PathBuf::from("saves/save.json"));
        assert!(!config.is_ai_available());
        assert!(config.story.starts_with("The Eidolon"));
        assert!(config.reminder.starts_with("REMINDER:"));
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = GameConfig::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("FRAMETALE_SUMMARIZATION_MODEL", "cheap/model"),
            ("FRAMETALE_MAX_TOOL_ITERATIONS", "3"),
            ("FRAMETALE_REQUEST_TIMEOUT_SECS", "0"),
            ("SAVE_FILE_PATH", "/tmp/frametale.json"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.summarization_model, "cheap/model");
        assert_eq!(config.narration_model, DEFAULT_MODEL);
        assert_eq!(config.max_tool_iterations, 3);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.save_path, PathBuf::from("/tmp/frametale.json"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = GameConfig::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "   "),
            ("FRAMETALE_DEBUG_PASSWORD", ""),
        ]))
        .unwrap();
        assert!(!config.is_ai_available());
        assert!(config.debug_password.is_none());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = GameConfig::from_lookup(lookup(&[("FRAMETALE_MAX_TOOL_ITERATIONS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("FRAMETALE_MAX_TOOL_ITERATIONS"));

        let err = GameConfig::from_lookup(lookup(&[("FRAMETALE_MAX_TOOL_ITERATIONS", "0")]));
        assert!(err.is_err());

        let err = GameConfig::from_lookup(lookup(&[("FRAMETALE_REQUEST_TIMEOUT_SECS", "-1")]));
        assert!(err.is_err());
    }

    #[test]
    fn test_api_base_url() {
        let config = GameConfig::default();
        assert_eq!(config.api_base_url(), "https://openrouter.ai/api/v1");

        let config = config.with_api_url("http://localhost:8080/v1/");
        assert_eq!(config.api_base_url(), "http://localhost:8080/v1");
    }
}
