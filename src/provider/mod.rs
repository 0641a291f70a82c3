//! Model provider trait and the Anthropic implementation.

pub mod anthropic;
pub mod format;
pub mod http;

pub use anthropic::AnthropicProvider;
pub use format::format_text_content;

use async_trait::async_trait;

use crate::error::OrchestratorError;
use crate::models::AnthropicModel;
use crate::types::{ChatTurn, ContentBlock, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: AnthropicModel,
    pub max_tokens: u32,
    pub system: Option<String>,
    pub messages: Vec<ChatTurn>,
    pub tools: Vec<ToolDefinition>,
}

impl ProviderRequest {
    /// A plain chat request with no system prompt and no tools.
    pub fn new(model: AnthropicModel, max_tokens: u32, messages: Vec<ChatTurn>) -> Self {
        Self {
            model,
            max_tokens,
            system: None,
            messages,
            tools: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

impl ProviderResponse {
    /// Response consisting of a single text block.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            ..Default::default()
        }
    }

    /// Newline join of the textual segments; other segments are dropped.
    pub fn text(&self) -> String {
        format_text_content(&self.content)
    }
}

/// Inference endpoint seam.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "anthropic").
    fn provider_name(&self) -> &str;

    /// Send one request and wait for the complete response.
    async fn create_message(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, OrchestratorError>;
}
