use crate::agent::AgentKind;

/// System prompt for the proposal call.
pub fn orchestrator_prompt() -> String {
    let agents = AgentKind::ALL
        .iter()
        .map(|kind| format!("{kind} ({})", kind.description()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You have the following agents: {agents}.

You also have additional tools that have been passed into you.

Choose which agent to use, what text to pass into the agent, which tools to use (if any), and the arguments to those tools.

The output must be a single JSON object of the form:
{{
    "agent": "<agent to use>",
    "agent_text": "<text to pass to agent>",
    "tools": [["<tool name>", {{<tool arguments>}}], ...]
}}

Only give outputs in the form of this JSON object, no additional text."#
    )
}
