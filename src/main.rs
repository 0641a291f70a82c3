//! relay CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use relay::cli::Cli;
use relay::config::OrchestratorConfig;
use relay::error::OrchestratorError;
use relay::mcp::{list_tools_or_close, MCPClient, ServerLaunch};
use relay::orchestrator::{Orchestrator, StdConsole};
use relay::provider::AnthropicProvider;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), OrchestratorError> {
    // Validate everything local before spawning the server.
    let launch = ServerLaunch::from_script_path(&cli.server_script)?;
    let config = cli.apply(OrchestratorConfig::from_env()?);
    let provider = Arc::new(AnthropicProvider::from_config(&config)?);

    let mut client = MCPClient::connect_stdio(launch).await?;
    let tools = list_tools_or_close(&mut client).await?;
    let names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
    println!("\nConnected to server with tools: {names:?}");

    let mut orchestrator = Orchestrator::new(provider, client, StdConsole::new(), config);
    orchestrator.run().await?;
    Ok(())
}
