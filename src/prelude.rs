//! Convenience re-exports for common use.

pub use crate::action::{parse_action, ActionRecord, ToolInvocation};
pub use crate::agent::{Agent, AgentKind};
pub use crate::config::OrchestratorConfig;
pub use crate::error::{OrchestratorError, Result};
pub use crate::mcp::{MCPClient, ServerLaunch, ToolServer};
pub use crate::models::AnthropicModel;
pub use crate::orchestrator::{Console, Orchestrator, RunOutcome, StdConsole};
pub use crate::provider::{AnthropicProvider, ModelProvider};
pub use crate::types::{ChatTurn, Role};
