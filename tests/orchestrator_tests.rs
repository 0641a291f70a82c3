//! End-to-end tests of the proposal/refinement/execution loop.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{capture_logs, FakeToolServer, MockProvider, ScriptedConsole};
use relay::config::OrchestratorConfig;
use relay::error::OrchestratorError;
use relay::mcp::list_tools_or_close;
use relay::models::AnthropicModel;
use relay::orchestrator::{Orchestrator, RunOutcome};
use relay::provider::ModelProvider;
use relay::types::ChatTurn;

fn orchestrator(
    provider: &Arc<MockProvider>,
    tools: &FakeToolServer,
    lines: &[&str],
) -> Orchestrator<FakeToolServer, ScriptedConsole> {
    let provider: Arc<dyn ModelProvider> = provider.clone();
    Orchestrator::new(
        provider,
        tools.clone(),
        ScriptedConsole::new(lines),
        OrchestratorConfig::default(),
    )
}

fn action(agent: &str, text: &str, tools: serde_json::Value) -> String {
    json!({"agent": agent, "agent_text": text, "tools": tools}).to_string()
}

#[tokio::test]
async fn text_agent_returns_agent_text_verbatim() {
    let provider = MockProvider::new();
    provider.queue_response(&action("TEXTagent", "hello", json!([])));
    let tools = FakeToolServer::new();

    let mut run = orchestrator(&provider, &tools, &["say hello", "execute"]);
    let outcome = run.run().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            result: "hello".into()
        }
    );
    assert_eq!(provider.request_count(), 1);
    assert!(run.console().transcript().contains("Final Result"));
    assert!(run.console().transcript().ends_with("hello"));
    assert_eq!(tools.log().lock().unwrap().close_calls, 1);
}

#[tokio::test]
async fn tool_output_is_appended_to_agent_text() {
    let provider = MockProvider::new();
    provider.queue_response(&action(
        "TEXTagent",
        "hello",
        json!([["search", {"query": "R"}]]),
    ));
    let tools = FakeToolServer::new();

    let outcome = orchestrator(&provider, &tools, &["look it up", "execute"])
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            result: "hello\nR".into()
        }
    );
    let log = tools.log();
    let log = log.lock().unwrap();
    assert_eq!(log.calls.len(), 1);
    assert_eq!(log.calls[0].0, "search");
    assert_eq!(log.calls[0].1.get("query"), Some(&json!("R")));
}

#[tokio::test]
async fn tools_run_in_listed_order() {
    let provider = MockProvider::new();
    provider.queue_response(&action(
        "TEXTagent",
        "start",
        json!([["search", {"query": "one"}], {"name": "search", "arguments": {"query": "two"}}]),
    ));
    let tools = FakeToolServer::new();

    let outcome = orchestrator(&provider, &tools, &["both", "execute"])
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            result: "start\none\ntwo".into()
        }
    );
}

#[tokio::test]
async fn unknown_agent_falls_back_to_text() {
    let provider = MockProvider::new();
    provider.queue_response(&action("UNKNOWN", "x", json!([])));
    let tools = FakeToolServer::new();

    let outcome = orchestrator(&provider, &tools, &["q", "execute"])
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed { result: "x".into() });
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn strong_agent_receives_combined_text_on_strong_model() {
    let provider = MockProvider::new();
    provider.queue_response(&action(
        "SONNETagent",
        "summarize",
        json!([["search", {"query": "R"}]]),
    ));
    provider.queue_response("summary");
    let tools = FakeToolServer::new();

    let outcome = orchestrator(&provider, &tools, &["q", "execute"])
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            result: "summary".into()
        }
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);

    let proposal = &requests[0];
    assert_eq!(proposal.model, AnthropicModel::default_strong());
    assert!(proposal.system.is_some());
    assert_eq!(proposal.tools.len(), 1);
    assert_eq!(proposal.tools[0].name, "search");

    let agent = &requests[1];
    assert_eq!(agent.model, AnthropicModel::default_strong());
    assert_eq!(agent.system, None);
    assert!(agent.tools.is_empty());
    assert_eq!(agent.messages, vec![ChatTurn::user("summarize\nR")]);
}

#[tokio::test]
async fn fast_agent_uses_fast_model() {
    let provider = MockProvider::new();
    provider.queue_response(&action("HAIKUagent", "quick", json!([])));
    provider.queue_response("fast reply");
    let tools = FakeToolServer::new();

    let outcome = orchestrator(&provider, &tools, &["q", "EXECUTE"])
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            result: "fast reply".into()
        }
    );
    assert_eq!(provider.requests()[1].model, AnthropicModel::default_fast());
}

#[tokio::test]
async fn quit_at_first_prompt_makes_no_calls() {
    let provider = MockProvider::new();
    let tools = FakeToolServer::new();

    let outcome = orchestrator(&provider, &tools, &["quit"])
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Quit);
    assert_eq!(provider.request_count(), 0);
    let log = tools.log();
    let log = log.lock().unwrap();
    assert_eq!(log.list_calls, 0);
    assert!(log.calls.is_empty());
    assert_eq!(log.close_calls, 1);
}

#[tokio::test]
async fn blank_queries_prompt_again() {
    let provider = MockProvider::new();
    let tools = FakeToolServer::new();

    let mut run = orchestrator(&provider, &tools, &["", "   ", "Quit"]);
    let outcome = run.run().await.unwrap();

    assert_eq!(outcome, RunOutcome::Quit);
    assert_eq!(run.console().prompts.len(), 3);
    assert!(run.history().is_empty());
}

#[tokio::test]
async fn end_of_input_is_treated_as_quit() {
    let provider = MockProvider::new();
    provider.queue_response(&action("TEXTagent", "never", json!([])));
    let tools = FakeToolServer::new();

    let outcome = orchestrator(&provider, &tools, &["q"]).run().await.unwrap();

    assert_eq!(outcome, RunOutcome::Quit);
    assert_eq!(provider.request_count(), 1);
    assert!(tools.log().lock().unwrap().calls.is_empty());
}

#[tokio::test]
async fn refinement_resends_full_history() {
    let first = action("TEXTagent", "long answer", json!([]));
    let second = action("TEXTagent", "short", json!([]));
    let provider = MockProvider::new();
    provider.queue_response(&first);
    provider.queue_response(&second);
    let tools = FakeToolServer::new();

    let mut run = orchestrator(&provider, &tools, &["q1", "make it shorter", "execute"]);
    let outcome = run.run().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            result: "short".into()
        }
    );
    assert_eq!(
        run.history(),
        &[
            ChatTurn::user("q1"),
            ChatTurn::assistant(first.clone()),
            ChatTurn::user("make it shorter"),
            ChatTurn::assistant(second),
        ]
    );

    let requests = provider.requests();
    assert_eq!(requests[0].messages, vec![ChatTurn::user("q1")]);
    assert_eq!(
        requests[1].messages,
        vec![
            ChatTurn::user("q1"),
            ChatTurn::assistant(first),
            ChatTurn::user("make it shorter"),
        ]
    );
    // The catalog is fetched again for every proposal.
    assert_eq!(tools.log().lock().unwrap().list_calls, 2);
}

#[tokio::test]
async fn proposal_failure_stops_the_run() {
    let provider = MockProvider::new();
    provider.queue_error(OrchestratorError::api(500, "overloaded"));
    let tools = FakeToolServer::new();

    let mut run = orchestrator(&provider, &tools, &["q", "execute"]);
    let err = run.run().await.unwrap_err();

    assert!(matches!(err, OrchestratorError::Api { status: 500, .. }));
    // Left for the caller to report.
    assert!(!run.console().transcript().contains("Error:"));
    // "execute" is never read.
    assert_eq!(run.console().prompts.len(), 1);
    let log = tools.log();
    let log = log.lock().unwrap();
    assert!(log.calls.is_empty());
    assert_eq!(log.close_calls, 1);
}

#[tokio::test]
async fn empty_proposal_is_an_error() {
    let provider = MockProvider::new();
    provider.queue_response("   ");
    let tools = FakeToolServer::new();

    let err = orchestrator(&provider, &tools, &["q", "execute"])
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::InvalidState(_)));
}

#[tokio::test]
async fn unparseable_proposal_fails_at_execute() {
    let provider = MockProvider::new();
    provider.queue_response("I would call the search tool first.");
    let tools = FakeToolServer::new();

    let err = orchestrator(&provider, &tools, &["q", "execute"])
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::ActionParse(_)));
    let log = tools.log();
    let log = log.lock().unwrap();
    assert!(log.calls.is_empty());
    assert_eq!(log.close_calls, 1);
}

#[tokio::test]
async fn fenced_proposal_is_accepted() {
    let provider = MockProvider::new();
    provider.queue_response(&format!(
        "```json\n{}\n```",
        action("TEXTagent", "fenced", json!([]))
    ));
    let tools = FakeToolServer::new();

    let outcome = orchestrator(&provider, &tools, &["q", "execute"])
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            result: "fenced".into()
        }
    );
}

#[tokio::test]
async fn tool_failure_aborts_execution() {
    let provider = MockProvider::new();
    provider.queue_response(&action(
        "SONNETagent",
        "x",
        json!([["missing", {}], ["search", {"query": "later"}]]),
    ));
    let tools = FakeToolServer::new();

    let err = orchestrator(&provider, &tools, &["q", "execute"])
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::ToolServer(ref m) if m.contains("missing")));
    assert_eq!(tools.log().lock().unwrap().calls.len(), 1);
    // The agent is never invoked.
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn proposal_history_is_logged_at_debug() {
    let (logs, _guard) = capture_logs();
    let provider = MockProvider::new();
    provider.queue_response(&action("TEXTagent", "done", json!([])));
    let tools = FakeToolServer::new();

    orchestrator(&provider, &tools, &["find the weather", "execute"])
        .run()
        .await
        .unwrap();

    let logs = logs.contents();
    assert!(logs.contains("proposal history"), "{logs}");
    assert!(logs.contains("find the weather"), "{logs}");
    assert!(logs.contains("\"agent_text\":\"done\""), "{logs}");
}

#[tokio::test]
async fn startup_listing_returns_catalog() {
    let mut tools = FakeToolServer::new();

    let catalog = list_tools_or_close(&mut tools).await.unwrap();

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "search");
    assert_eq!(tools.log().lock().unwrap().close_calls, 0);
}

#[tokio::test]
async fn startup_listing_failure_closes_the_server() {
    let (logs, _guard) = capture_logs();
    let mut tools = FakeToolServer::failing_listing().with_failing_close();

    let err = list_tools_or_close(&mut tools).await.unwrap_err();

    assert!(matches!(err, OrchestratorError::ToolServer(ref m) if m.contains("list_tools")));
    assert_eq!(tools.log().lock().unwrap().close_calls, 1);
    let logs = logs.contents();
    assert!(logs.contains("tool server close failed"), "{logs}");
    assert!(logs.contains("MCP session shutdown failed"), "{logs}");
}
