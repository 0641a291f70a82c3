//! Configuration (layered: CLI flags > env > `.env` file > defaults).

use std::fmt;

use crate::error::{OrchestratorError, Result};
use crate::models::AnthropicModel;

/// Default Anthropic Messages API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Default output-length ceiling for every inference call.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Explicit configuration handed to the provider, agents and orchestrator.
///
/// Nothing downstream reads the environment; everything flows from here.
#[derive(Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub strong_model: AnthropicModel,
    pub fast_model: AnthropicModel,
    pub max_tokens: u32,
}

impl fmt::Debug for OrchestratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrchestratorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("strong_model", &self.strong_model.as_str())
            .field("fast_model", &self.fast_model.as_str())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            strong_model: AnthropicModel::default_strong(),
            fast_model: AnthropicModel::default_fast(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl OrchestratorConfig {
    /// Load from environment variables, reading `.env` first if present.
    ///
    /// Recognized: `ANTHROPIC_API_KEY`, `ANTHROPIC_BASE_URL`,
    /// `RELAY_STRONG_MODEL`, `RELAY_FAST_MODEL`, `RELAY_MAX_TOKENS`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()) {
            config.api_key = Some(key);
        }
        if let Some(url) = lookup("ANTHROPIC_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("RELAY_STRONG_MODEL") {
            config.strong_model = parse_model(&model);
        }
        if let Some(model) = lookup("RELAY_FAST_MODEL") {
            config.fast_model = parse_model(&model);
        }
        if let Some(raw) = lookup("RELAY_MAX_TOKENS") {
            config.max_tokens = parse_max_tokens(&raw)?;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_strong_model(mut self, model: AnthropicModel) -> Self {
        self.strong_model = model;
        self
    }

    pub fn with_fast_model(mut self, model: AnthropicModel) -> Self {
        self.fast_model = model;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The API key, or an authentication error naming the missing variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| OrchestratorError::Authentication("Missing ANTHROPIC_API_KEY".into()))
    }
}

/// Parse a model id; unknown ids are kept as [`AnthropicModel::Custom`].
pub(crate) fn parse_model(raw: &str) -> AnthropicModel {
    let raw = raw.trim();
    raw.parse()
        .unwrap_or_else(|_| AnthropicModel::Custom(raw.to_string()))
}

fn parse_max_tokens(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(OrchestratorError::Configuration(format!(
            "RELAY_MAX_TOKENS must be a positive integer; got '{raw}'"
        ))),
        Ok(value) => Ok(value),
    }
}
