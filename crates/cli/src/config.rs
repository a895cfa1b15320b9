//! Configuration loading from deckhand.toml and the environment.

use runtime::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, OpenAiBackend};
use serde::Deserialize;
use std::path::Path;

/// Looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = "deckhand.toml";

pub const ENV_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_BASE_URL: &str = "DECKHAND_BASE_URL";
pub const ENV_MODEL: &str = "DECKHAND_MODEL";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Completion endpoint configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Optional system prompt sent ahead of the conversation.
    pub system: Option<String>,
}

/// Completion endpoint configuration.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible base URL, without `/chat/completions`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Endpoint credential. Usually supplied through the environment instead.
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load the given file, or [`CONFIG_FILE`] if present, or defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Override file settings with environment variables.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.backend.api_key = Some(key);
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.backend.base_url = base_url;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.backend.model = model;
        }
    }

    /// The endpoint credential. Required.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.backend.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Build the completion backend described by this configuration.
    pub fn backend(&self) -> Result<OpenAiBackend, ConfigError> {
        Ok(OpenAiBackend::builder(self.api_key()?)
            .model(&self.backend.model)
            .base_url(&self.backend.base_url)
            .max_tokens(self.backend.max_tokens)
            .build())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("API key not configured: set GROQ_API_KEY or backend.api_key")]
    MissingApiKey,
}
