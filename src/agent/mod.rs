//! Agent wrappers: text in, text out.

mod kind;

pub use kind::AgentKind;

use std::sync::Arc;

use tracing::debug;

use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::models::AnthropicModel;
use crate::provider::{ModelProvider, ProviderRequest};
use crate::types::ChatTurn;

/// A model-backed agent with its own conversation buffer.
pub struct ModelAgent {
    provider: Arc<dyn ModelProvider>,
    model: AnthropicModel,
    max_tokens: u32,
    messages: Vec<ChatTurn>,
}

impl ModelAgent {
    pub fn new(provider: Arc<dyn ModelProvider>, model: AnthropicModel, max_tokens: u32) -> Self {
        Self {
            provider,
            model,
            max_tokens,
            messages: Vec::new(),
        }
    }

    /// Turns accumulated so far, oldest first.
    pub fn messages(&self) -> &[ChatTurn] {
        &self.messages
    }

    /// Append `text` as a user turn, send the whole buffer, return the text reply.
    pub async fn execute(&mut self, text: &str) -> Result<String, OrchestratorError> {
        self.messages.push(ChatTurn::user(text));

        let request =
            ProviderRequest::new(self.model.clone(), self.max_tokens, self.messages.clone());
        debug!(
            provider = self.provider.provider_name(),
            model = self.model.as_str(),
            turns = self.messages.len(),
            "agent execute"
        );
        let response = self.provider.create_message(&request).await?;

        let reply = response.text();
        self.messages.push(ChatTurn::assistant(reply.clone()));
        Ok(reply)
    }
}

/// One of the three agents, dispatched statically by variant.
pub enum Agent {
    Strong(ModelAgent),
    Fast(ModelAgent),
    Text,
}

impl Agent {
    /// Create a fresh agent of the given kind.
    pub fn new(
        kind: AgentKind,
        provider: Arc<dyn ModelProvider>,
        config: &OrchestratorConfig,
    ) -> Self {
        match kind {
            AgentKind::Sonnet => Self::Strong(ModelAgent::new(
                provider,
                config.strong_model.clone(),
                config.max_tokens,
            )),
            AgentKind::Haiku => Self::Fast(ModelAgent::new(
                provider,
                config.fast_model.clone(),
                config.max_tokens,
            )),
            AgentKind::Text => Self::Text,
        }
    }

    pub async fn execute(&mut self, text: &str) -> Result<String, OrchestratorError> {
        match self {
            Self::Strong(agent) | Self::Fast(agent) => agent.execute(text).await,
            Self::Text => Ok(text.to_string()),
        }
    }
}
