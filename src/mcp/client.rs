//! MCP client for one tool server.

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParams, CallToolResult, Content, JsonObject, ProtocolVersion},
    service::{ClientInitializeError, ServiceError},
};
use tracing::{debug, warn};

use crate::error::OrchestratorError;

use super::schema::MCPToolSchema;
use super::transport::{MCPRunningService, MCPTransport, ServerLaunch, StdioTransport};
use super::ToolServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MCPConnectionState {
    Disconnected,
    Initialized,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MCPToolCallResult {
    /// Newline join of the textual content segments.
    pub text: String,
    pub is_error: bool,
}

/// Client for a Model Context Protocol server.
pub struct MCPClient {
    transport: Option<Box<dyn MCPTransport>>,
    session: Option<MCPRunningService>,
    state: MCPConnectionState,
}

impl MCPClient {
    /// Create a new, not yet initialized client over the given transport.
    pub fn new(transport: Box<dyn MCPTransport>) -> Self {
        Self {
            transport: Some(transport),
            session: None,
            state: MCPConnectionState::Disconnected,
        }
    }

    /// Create a client from an already-running rmcp service.
    ///
    /// Initialization handshake is already handled by rmcp `serve(...)`.
    pub fn from_running_service(session: MCPRunningService) -> Self {
        Self {
            transport: None,
            session: Some(session),
            state: MCPConnectionState::Initialized,
        }
    }

    /// Spawn the server described by `launch` and complete the handshake.
    pub async fn connect_stdio(launch: ServerLaunch) -> Result<Self, OrchestratorError> {
        let mut client = Self::new(Box::new(StdioTransport::new(launch)));
        client.initialize().await?;
        Ok(client)
    }

    pub fn connection_state(&self) -> MCPConnectionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == MCPConnectionState::Initialized
    }

    /// Initialize the MCP connection.
    pub async fn initialize(&mut self) -> Result<(), OrchestratorError> {
        match self.state {
            MCPConnectionState::Initialized => return Ok(()),
            MCPConnectionState::Closed => {
                return Err(OrchestratorError::InvalidState("MCP session is closed".into()))
            }
            MCPConnectionState::Disconnected => {}
        }

        let session = self.connect_with_protocol_fallback().await?;
        if let Some(info) = session.peer_info() {
            debug!(server = %info.server_info.name, "MCP session initialized");
        }
        self.session = Some(session);
        self.state = MCPConnectionState::Initialized;
        Ok(())
    }

    /// List available tools from the MCP server.
    pub async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, OrchestratorError> {
        let session = self.active_session()?;

        let tools = match session.list_all_tools().await {
            Ok(tools) => tools,
            Err(ServiceError::UnexpectedResponse) => session
                .list_tools(None)
                .await
                .map(|page| page.tools)
                .map_err(|e| map_service_error("list_tools", e))?,
            Err(e) => return Err(map_service_error("list_tools", e)),
        };

        Ok(tools.into_iter().map(map_mcp_tool_schema).collect())
    }

    /// Execute a tool on the MCP server.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, OrchestratorError> {
        let arguments = coerce_tool_arguments(arguments)?;
        let session = self.active_session()?;

        debug!(tool = name, "MCP call_tool");
        let result = session
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
                task: None,
            })
            .await
            .map_err(|e| map_service_error("call_tool", e))?;

        Ok(map_call_result(name, result))
    }

    /// Stop the server process and release the session. Idempotent.
    pub async fn close(&mut self) -> Result<(), OrchestratorError> {
        if self.state == MCPConnectionState::Closed {
            return Ok(());
        }
        self.state = MCPConnectionState::Closed;
        self.transport = None;

        if let Some(session) = self.session.take() {
            let reason = session.cancel().await.map_err(|e| {
                OrchestratorError::ToolServer(format!("MCP session shutdown failed: {e}"))
            })?;
            debug!(?reason, "MCP session closed");
        }
        Ok(())
    }

    fn active_session(&mut self) -> Result<&mut MCPRunningService, OrchestratorError> {
        match self.state {
            MCPConnectionState::Initialized => {}
            MCPConnectionState::Closed => {
                return Err(OrchestratorError::InvalidState("MCP session is closed".into()))
            }
            MCPConnectionState::Disconnected => {
                return Err(OrchestratorError::InvalidState(
                    "MCP client must be initialized first".into(),
                ))
            }
        }
        self.session
            .as_mut()
            .ok_or_else(|| OrchestratorError::InvalidState("Missing MCP session".into()))
    }

    async fn connect_with_protocol_fallback(
        &mut self,
    ) -> Result<MCPRunningService, OrchestratorError> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| OrchestratorError::Configuration("Missing MCP transport".into()))?;

        let latest_client_info = rmcp::model::ClientInfo {
            protocol_version: ProtocolVersion::LATEST,
            ..Default::default()
        };

        match transport.connect(latest_client_info).await {
            Ok(session) => return Ok(session),
            Err(error) if should_retry_protocol_fallback(&error) => {
                debug!("MCP server rejected latest protocol version; retrying with 2024-11-05");
            }
            Err(error) => return Err(map_client_initialize_error(error)),
        }

        let fallback_client_info = rmcp::model::ClientInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            ..Default::default()
        };
        transport
            .connect(fallback_client_info)
            .await
            .map_err(map_client_initialize_error)
    }
}

#[async_trait]
impl ToolServer for MCPClient {
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, OrchestratorError> {
        MCPClient::list_tools(self).await
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<String, OrchestratorError> {
        let result = MCPClient::call_tool(self, name, serde_json::Value::Object(arguments)).await?;
        Ok(result.text)
    }

    async fn close(&mut self) -> Result<(), OrchestratorError> {
        MCPClient::close(self).await
    }
}

fn should_retry_protocol_fallback(error: &ClientInitializeError) -> bool {
    match error {
        ClientInitializeError::JsonRpcError(error) => {
            let message = error.message.to_ascii_lowercase();
            message.contains("protocol") && message.contains("version")
        }
        _ => false,
    }
}

fn map_mcp_tool_schema(tool: rmcp::model::Tool) -> MCPToolSchema {
    MCPToolSchema {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()),
        input_schema: serde_json::Value::Object((*tool.input_schema).clone()),
    }
}

fn coerce_tool_arguments(value: serde_json::Value) -> Result<Option<JsonObject>, OrchestratorError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
                OrchestratorError::InvalidArgument(format!(
                    "MCP tool arguments must be valid JSON: {e}"
                ))
            })?;
            coerce_tool_arguments(parsed)
        }
        other => Err(OrchestratorError::InvalidArgument(format!(
            "MCP tool arguments must be a JSON object; got {other}"
        ))),
    }
}

fn extract_text_content(content: &[Content]) -> String {
    content
        .iter()
        .filter_map(|item| item.as_text().map(|text| text.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn map_call_result(name: &str, result: CallToolResult) -> MCPToolCallResult {
    let text = extract_text_content(&result.content);
    let is_error = result.is_error.unwrap_or(false);
    if is_error {
        warn!(tool = name, "MCP tool reported an error result");
    }
    MCPToolCallResult { text, is_error }
}

fn map_client_initialize_error(error: ClientInitializeError) -> OrchestratorError {
    match error {
        ClientInitializeError::ConnectionClosed(context) => {
            OrchestratorError::ToolServer(format!("MCP initialize connection closed: {context}"))
        }
        ClientInitializeError::TransportError { error, context } => OrchestratorError::ToolServer(
            format!("MCP initialize transport error ({context}): {error}"),
        ),
        ClientInitializeError::JsonRpcError(error) => OrchestratorError::ToolServer(format!(
            "MCP initialize JSON-RPC error {}: {}",
            error.code.0, error.message
        )),
        ClientInitializeError::Cancelled => {
            OrchestratorError::ToolServer("MCP initialize cancelled".into())
        }
        other => OrchestratorError::ToolServer(format!("MCP initialize error: {other}")),
    }
}

fn map_service_error(context: &str, error: ServiceError) -> OrchestratorError {
    match error {
        ServiceError::McpError(error) => OrchestratorError::ToolServer(format!(
            "{context}: MCP error {}: {}",
            error.code.0, error.message
        )),
        ServiceError::TransportSend(error) => {
            OrchestratorError::ToolServer(format!("{context}: MCP transport send failed: {error}"))
        }
        ServiceError::TransportClosed => {
            OrchestratorError::ToolServer(format!("{context}: MCP transport closed"))
        }
        ServiceError::UnexpectedResponse => {
            OrchestratorError::ToolServer(format!("{context}: unexpected MCP response"))
        }
        ServiceError::Cancelled { reason } => {
            let suffix = reason
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            OrchestratorError::ToolServer(format!("{context}: MCP request cancelled{suffix}"))
        }
        ServiceError::Timeout { timeout } => OrchestratorError::Timeout(timeout.as_millis() as u64),
        other => OrchestratorError::ToolServer(format!("{context}: MCP service error: {other}")),
    }
}
