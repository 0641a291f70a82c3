//! Typed parse of the orchestrator's proposal into an action record.
//!
//! The model is asked to reply with a JSON object of the form
//!
//! ```json
//! {
//!   "agent": "SONNETagent",
//!   "agent_text": "Summarize the following.",
//!   "tools": [["search", {"q": "rust"}]]
//! }
//! ```
//!
//! Parsing is a plain deserialization: nothing in the reply is evaluated,
//! and any shape mismatch is an [`OrchestratorError::ActionParse`].

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::agent::AgentKind;
use crate::error::OrchestratorError;

/// The decision produced once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionRecord {
    #[serde(default)]
    pub agent: AgentKind,
    pub agent_text: String,
    pub tools: Vec<ToolInvocation>,
}

/// One tool call to run before the agent, in record order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInvocation")]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Result<Self, String> {
        let name = name.into();
        let arguments = match arguments {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                return Err(format!(
                    "arguments for tool '{name}' must be an object; got {other}"
                ))
            }
        };
        Ok(Self { name, arguments })
    }
}

/// Accepted spellings of a tool entry: `[name, args]` or `{name, arguments}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInvocation {
    Pair(String, serde_json::Value),
    Named {
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    },
}

impl TryFrom<RawInvocation> for ToolInvocation {
    type Error = String;

    fn try_from(raw: RawInvocation) -> Result<Self, Self::Error> {
        match raw {
            RawInvocation::Pair(name, arguments) | RawInvocation::Named { name, arguments } => {
                ToolInvocation::new(name, arguments)
            }
        }
    }
}

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)\A```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\z")
            .expect("code fence regex must compile")
    })
}

/// Remove a Markdown code fence wrapping the whole reply, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match code_fence().captures(trimmed).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => trimmed,
    }
}

/// Parse proposal text into an [`ActionRecord`].
pub fn parse_action(text: &str) -> Result<ActionRecord, OrchestratorError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(OrchestratorError::ActionParse("proposal is empty".into()));
    }
    serde_json::from_str(body).map_err(|e| OrchestratorError::ActionParse(e.to_string()))
}
