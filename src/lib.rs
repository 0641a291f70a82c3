//! relay: route an operator's request to a Claude agent, running MCP tools first.
//!
//! The model proposes an action record naming one of three agents, the text
//! to hand it, and the tools to call beforehand. The operator refines the
//! proposal until they type `execute`; the tools then run in order and their
//! text output is appended to the agent's input.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use relay::prelude::*;
//!
//! # async fn example() -> relay::error::Result<()> {
//! let config = OrchestratorConfig::from_env()?;
//! let provider = Arc::new(AnthropicProvider::from_config(&config)?);
//! let launch = ServerLaunch::from_script_path("weather.py")?;
//! let client = MCPClient::connect_stdio(launch).await?;
//!
//! let mut orchestrator = Orchestrator::new(provider, client, StdConsole::new(), config);
//! orchestrator.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod agent;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod orchestrator;
pub mod prelude;
pub mod provider;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
