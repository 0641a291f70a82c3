//! Command-line arguments for the relay binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{parse_model, OrchestratorConfig};

/// Route a request to a Claude agent, optionally running MCP tools first.
#[derive(Parser, Debug)]
#[command(name = "relay", version, about)]
pub struct Cli {
    /// Path to the MCP server script (.py or .js)
    pub server_script: PathBuf,

    /// Model for SONNETagent and for proposing actions
    #[arg(long)]
    pub strong_model: Option<String>,

    /// Model for HAIKUagent
    #[arg(long)]
    pub fast_model: Option<String>,

    /// Output token ceiling for every model call
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_tokens: Option<u32>,
}

impl Cli {
    /// Layer command-line overrides on top of `config`.
    pub fn apply(&self, mut config: OrchestratorConfig) -> OrchestratorConfig {
        if let Some(ref model) = self.strong_model {
            config = config.with_strong_model(parse_model(model));
        }
        if let Some(ref model) = self.fast_model {
            config = config.with_fast_model(parse_model(model));
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        config
    }
}
