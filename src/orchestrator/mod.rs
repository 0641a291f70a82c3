//! The interactive proposal/refinement/execution loop.
//!
//! ```text
//! AwaitingQuery      --query-->       Proposing
//! AwaitingQuery      --quit-->        Terminated
//! Proposing          --reply-->       AwaitingRefinement
//! Proposing          --error-->       Failed
//! AwaitingRefinement --refinement-->  Proposing
//! AwaitingRefinement --execute-->     Executing
//! AwaitingRefinement --quit-->        Terminated
//! Executing          --result-->      Terminated
//! ```

mod console;
mod prompt;
mod state;

pub use console::{Console, StdConsole};
pub use prompt::orchestrator_prompt;
pub use state::{LoopState, RunOutcome};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::action::parse_action;
use crate::agent::Agent;
use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::mcp::{MCPToolSchema, ToolServer};
use crate::provider::{ModelProvider, ProviderRequest};
use crate::types::ChatTurn;

use state::Command;

const RESULT_BANNER: &str = "\n\n----------\nFinal Result\n----------\n\n";

/// Drives one run against a model provider and a tool server.
pub struct Orchestrator<S, C> {
    provider: Arc<dyn ModelProvider>,
    tool_server: S,
    console: C,
    config: OrchestratorConfig,
    system_prompt: String,
    history: Vec<ChatTurn>,
}

impl<S, C> Orchestrator<S, C>
where
    S: ToolServer,
    C: Console,
{
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tool_server: S,
        console: C,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            tool_server,
            console,
            config,
            system_prompt: orchestrator_prompt(),
            history: Vec::new(),
        }
    }

    /// Turns exchanged with the model during the proposal phase.
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Run the loop to completion, then close the tool server.
    ///
    /// The tool server is closed once on every exit path. A close failure
    /// is returned only if the run itself succeeded.
    pub async fn run(&mut self) -> Result<RunOutcome, OrchestratorError> {
        let outcome = self.drive().await;
        for (index, turn) in self.history.iter().enumerate() {
            debug!(index, role = ?turn.role, content = %turn.content, "proposal history");
        }

        match (outcome, self.tool_server.close().await) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(close_error)) => Err(close_error),
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(close_error)) => {
                warn!(error = %close_error, "tool server close failed after run error");
                Err(error)
            }
        }
    }

    async fn drive(&mut self) -> Result<RunOutcome, OrchestratorError> {
        self.console
            .print("\nMCP Client Started!\nType your initial query or 'quit' to exit.");

        let mut state = LoopState::AwaitingQuery;
        loop {
            debug!(state = state.name(), "orchestrator state");
            state = match state {
                LoopState::AwaitingQuery => self.await_query().await?,
                LoopState::Proposing => match self.propose().await {
                    Ok(proposal) => LoopState::AwaitingRefinement { proposal },
                    Err(error) => LoopState::Failed(error),
                },
                LoopState::AwaitingRefinement { proposal } => {
                    self.await_refinement(proposal).await?
                }
                LoopState::Executing { proposal } => {
                    let result = self.execute_action(&proposal).await?;
                    self.console.print(RESULT_BANNER);
                    self.console.print(&result);
                    LoopState::Terminated(RunOutcome::Completed { result })
                }
                // Reported once, by the caller.
                LoopState::Failed(error) => return Err(error),
                LoopState::Terminated(outcome) => return Ok(outcome),
            };
        }
    }

    async fn await_query(&mut self) -> Result<LoopState, OrchestratorError> {
        loop {
            let Some(query) = self.console.read_line("\nQuery: ").await? else {
                return Ok(LoopState::Terminated(RunOutcome::Quit));
            };
            let query = query.trim();
            if query.is_empty() {
                continue;
            }
            if Command::parse(query) == Some(Command::Quit) {
                return Ok(LoopState::Terminated(RunOutcome::Quit));
            }

            self.history.push(ChatTurn::user(query));
            self.console
                .print("We will now propose actions.  Describe refinements or say execute.");
            return Ok(LoopState::Proposing);
        }
    }

    async fn await_refinement(&mut self, proposal: String) -> Result<LoopState, OrchestratorError> {
        loop {
            let Some(input) = self
                .console
                .read_line("\nDescribe refinements or say execute: ")
                .await?
            else {
                return Ok(LoopState::Terminated(RunOutcome::Quit));
            };
            let input = input.trim();
            match Command::parse(input) {
                Some(Command::Execute) => return Ok(LoopState::Executing { proposal }),
                Some(Command::Quit) => return Ok(LoopState::Terminated(RunOutcome::Quit)),
                None if input.is_empty() => continue,
                None => {
                    self.history.push(ChatTurn::user(input));
                    return Ok(LoopState::Proposing);
                }
            }
        }
    }

    /// Ask the model for a proposal over the whole history and tool catalog.
    async fn propose(&mut self) -> Result<String, OrchestratorError> {
        let tools = self
            .tool_server
            .list_tools()
            .await?
            .iter()
            .map(MCPToolSchema::to_tool_definition)
            .collect();

        let request = ProviderRequest::new(
            self.config.strong_model.clone(),
            self.config.max_tokens,
            self.history.clone(),
        )
        .with_system(self.system_prompt.clone())
        .with_tools(tools);

        let response = self.provider.create_message(&request).await?;
        let proposal = response.text();
        if proposal.trim().is_empty() {
            return Err(OrchestratorError::InvalidState(
                "model returned no text proposal".into(),
            ));
        }

        self.history.push(ChatTurn::assistant(proposal.clone()));
        self.console.print(&format!("\n{proposal}"));
        Ok(proposal)
    }

    /// Parse `proposal`, run its tools in order, and hand the combined text
    /// to a fresh agent of the selected kind.
    pub async fn execute_action(&mut self, proposal: &str) -> Result<String, OrchestratorError> {
        let action = parse_action(proposal)?;
        debug!(agent = %action.agent, tools = action.tools.len(), "executing action");

        let mut text = action.agent_text;
        for invocation in action.tools {
            let output = self
                .tool_server
                .call_tool(&invocation.name, invocation.arguments)
                .await?;
            text.push('\n');
            text.push_str(&output);
        }

        let mut agent = Agent::new(action.agent, Arc::clone(&self.provider), &self.config);
        agent.execute(&text).await
    }
}
