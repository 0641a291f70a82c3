//! Model Context Protocol (MCP) tool-server connector.

pub mod client;
pub mod schema;
pub mod transport;

pub use client::{MCPClient, MCPConnectionState, MCPToolCallResult};
pub use schema::MCPToolSchema;
pub use transport::{MCPTransport, ServerLaunch, StdioTransport};

use async_trait::async_trait;
use rmcp::model::JsonObject;
use tracing::warn;

use crate::error::OrchestratorError;

/// The operations the orchestrator needs from a tool server.
#[async_trait]
pub trait ToolServer: Send {
    /// List the server's tools. Every call is a fresh round trip.
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, OrchestratorError>;

    /// Call one tool and return its textual output.
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<String, OrchestratorError>;

    /// Release the connection. Must be safe to call more than once.
    async fn close(&mut self) -> Result<(), OrchestratorError>;
}

/// List tools on a freshly connected server, closing it if the listing fails.
pub async fn list_tools_or_close<S>(
    server: &mut S,
) -> Result<Vec<MCPToolSchema>, OrchestratorError>
where
    S: ToolServer + ?Sized,
{
    match server.list_tools().await {
        Ok(tools) => Ok(tools),
        Err(error) => {
            if let Err(close_error) = server.close().await {
                warn!(error = %close_error, "tool server close failed after listing error");
            }
            Err(error)
        }
    }
}
