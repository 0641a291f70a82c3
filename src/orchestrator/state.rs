use crate::error::OrchestratorError;

/// States of the interactive loop.
#[derive(Debug)]
pub enum LoopState {
    AwaitingQuery,
    Proposing,
    AwaitingRefinement { proposal: String },
    Executing { proposal: String },
    Failed(OrchestratorError),
    Terminated(RunOutcome),
}

impl LoopState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AwaitingQuery => "awaiting_query",
            Self::Proposing => "proposing",
            Self::AwaitingRefinement { .. } => "awaiting_refinement",
            Self::Executing { .. } => "executing",
            Self::Failed(_) => "failed",
            Self::Terminated(_) => "terminated",
        }
    }
}

/// How a run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The operator typed `quit` or closed the input.
    Quit,
    /// The selected agent produced `result`.
    Completed { result: String },
}

/// Operator commands recognized at the prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Execute,
    Quit,
}

impl Command {
    pub(crate) fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "execute" => Some(Self::Execute),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}
