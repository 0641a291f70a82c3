//! Anthropic model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Anthropic models known to relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AnthropicModel {
    #[strum(serialize = "claude-3-5-sonnet-20241022")]
    ClaudeSonnet35,
    #[strum(serialize = "claude-3-5-haiku-20241022")]
    ClaudeHaiku35,
    #[strum(serialize = "claude-sonnet-4-20250514")]
    ClaudeSonnet4,
    #[strum(serialize = "claude-opus-4-5-20251101")]
    ClaudeOpus45,
    /// Custom/unknown Anthropic model by ID.
    #[strum(default)]
    Custom(String),
}

impl AnthropicModel {
    /// Model backing the strong agent and the orchestration call.
    pub fn default_strong() -> Self {
        Self::ClaudeSonnet35
    }

    /// Model backing the fast agent.
    pub fn default_fast() -> Self {
        Self::ClaudeHaiku35
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ClaudeSonnet35 => "claude-3-5-sonnet-20241022",
            Self::ClaudeHaiku35 => "claude-3-5-haiku-20241022",
            Self::ClaudeSonnet4 => "claude-sonnet-4-20250514",
            Self::ClaudeOpus45 => "claude-opus-4-5-20251101",
            Self::Custom(s) => s,
        }
    }
}
