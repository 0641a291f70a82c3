//! MCP transport layer: launch-command selection and the stdio transport.

use std::path::Path;

use async_trait::async_trait;
use rmcp::model::ClientInfo;
use rmcp::service::{ClientInitializeError, DynService, RoleClient, RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use tokio::process::Command;
use tracing::debug;

use crate::error::OrchestratorError;

pub type DynClientService = Box<dyn DynService<RoleClient>>;
pub type MCPRunningService = RunningService<RoleClient, DynClientService>;

const PYTHON_COMMAND: &str = "python";
const NODE_COMMAND: &str = "node";

/// Command line used to start a tool-server script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLaunch {
    pub command: String,
    pub args: Vec<String>,
}

impl ServerLaunch {
    /// Pick the interpreter from the script suffix: `.py` or `.js`.
    ///
    /// The suffix is matched on the path text, so `servers/.py` counts.
    /// Anything else is rejected here, before a process is spawned.
    pub fn from_script_path(path: impl AsRef<Path>) -> Result<Self, OrchestratorError> {
        let script = path.as_ref().to_string_lossy().into_owned();
        let command = if script.ends_with(".py") {
            PYTHON_COMMAND
        } else if script.ends_with(".js") {
            NODE_COMMAND
        } else {
            return Err(OrchestratorError::Configuration(format!(
                "Server script must be a .py or .js file: {script}"
            )));
        };

        Ok(Self {
            command: command.to_string(),
            args: vec![script],
        })
    }
}

/// Transport trait for MCP communication.
#[async_trait]
pub trait MCPTransport: Send {
    /// Create and initialize a new rmcp running service for this transport.
    async fn connect(
        &mut self,
        client_info: ClientInfo,
    ) -> Result<MCPRunningService, ClientInitializeError>;
}

/// Stdio-based MCP transport: the server runs as a child process.
pub struct StdioTransport {
    launch: ServerLaunch,
}

impl StdioTransport {
    pub fn new(launch: ServerLaunch) -> Self {
        Self { launch }
    }
}

#[async_trait]
impl MCPTransport for StdioTransport {
    async fn connect(
        &mut self,
        client_info: ClientInfo,
    ) -> Result<MCPRunningService, ClientInitializeError> {
        debug!(command = %self.launch.command, args = ?self.launch.args, "spawning MCP server");

        let mut command = Command::new(&self.launch.command);
        command.args(&self.launch.args);
        let transport = TokioChildProcess::new(command).map_err(|error| {
            ClientInitializeError::transport::<TokioChildProcess>(error, "spawn stdio transport")
        })?;

        client_info.into_dyn().serve(transport).await
    }
}
