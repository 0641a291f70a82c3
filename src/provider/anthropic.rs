//! Anthropic Messages API provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::{OrchestratorConfig, DEFAULT_BASE_URL};
use crate::error::OrchestratorError;
use crate::types::{ContentBlock, Usage};

use super::http::{anthropic_headers, shared_client};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const API_VERSION: &str = "2023-06-01";

/// Non-streaming client for `POST /messages`.
///
/// The model is chosen per request, so one provider serves the
/// orchestration call and every agent.
pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Build a provider from explicit configuration.
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self, OrchestratorError> {
        let api_key = config.require_api_key()?;
        Ok(Self::new(api_key.to_string(), Some(config.base_url.clone())))
    }

    fn build_headers(&self) -> reqwest::header::HeaderMap {
        anthropic_headers(&self.api_key, API_VERSION)
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model.as_str(),
            "max_tokens": request.max_tokens,
            "messages": request.messages,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(ref system) = request.system {
                obj.insert("system".into(), system.clone().into());
            }
            if !request.tools.is_empty() {
                let tool_defs: Vec<serde_json::Value> = request
                    .tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "name": t.name,
                            "description": t.description,
                            "input_schema": t.input_schema,
                        })
                    })
                    .collect();
                obj.insert("tools".into(), tool_defs.into());
            }
        }

        body
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn create_message(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, OrchestratorError> {
        let body = self.build_request_body(request);
        let url = format!("{}/messages", self.base_url);

        debug!(
            model = request.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Anthropic create_message"
        );

        let resp = shared_client()
            .post(&url)
            .headers(self.build_headers())
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(super::http::status_to_error(status, &body_text));
        }

        let data: AnthropicResponse = resp.json().await?;
        let dropped = data
            .content
            .iter()
            .filter(|block| block.as_text().is_none())
            .count();
        if dropped > 0 {
            debug!(dropped, "ignoring non-text response segments");
        }

        Ok(ProviderResponse {
            content: data.content,
            stop_reason: data.stop_reason,
            usage: data.usage,
        })
    }
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}
