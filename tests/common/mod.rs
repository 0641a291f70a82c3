//! Shared test helpers: mock provider, fake tool server, scripted console.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use relay::error::OrchestratorError;
use relay::mcp::{MCPToolSchema, ToolServer};
use relay::orchestrator::Console;
use relay::provider::{ModelProvider, ProviderRequest, ProviderResponse};

/// A mock provider that returns canned responses and records every request.
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse, OrchestratorError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ProviderResponse::from_text(text)));
    }

    /// Queue a failure.
    pub fn queue_error(&self, error: OrchestratorError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn create_message(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, OrchestratorError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ProviderResponse::from_text("Mock response")))
    }
}

/// Observable state of a [`FakeToolServer`], shared with the test body.
#[derive(Debug, Default)]
pub struct ToolServerLog {
    pub list_calls: usize,
    pub calls: Vec<(String, Map<String, Value>)>,
    pub close_calls: usize,
}

/// In-process tool server exposing `search`, which echoes its `query`.
#[derive(Clone, Default)]
pub struct FakeToolServer {
    log: Arc<Mutex<ToolServerLog>>,
    fail_listing: bool,
    fail_close: bool,
}

impl FakeToolServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A server whose `tools/list` always fails.
    pub fn failing_listing() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }

    /// Make `close` report a failure (it is still counted).
    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn log(&self) -> Arc<Mutex<ToolServerLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl ToolServer for FakeToolServer {
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, OrchestratorError> {
        self.log.lock().unwrap().list_calls += 1;
        if self.fail_listing {
            return Err(OrchestratorError::ToolServer(
                "list_tools: MCP transport closed".into(),
            ));
        }
        Ok(vec![MCPToolSchema {
            name: "search".into(),
            description: Some("Search the index".into()),
            input_schema: json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
        }])
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, OrchestratorError> {
        self.log
            .lock()
            .unwrap()
            .calls
            .push((name.to_string(), arguments.clone()));
        match name {
            "search" => Ok(arguments
                .get("query")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()),
            other => Err(OrchestratorError::ToolServer(format!(
                "call_tool: MCP error -32602: Unknown tool: {other}"
            ))),
        }
    }

    async fn close(&mut self) -> Result<(), OrchestratorError> {
        self.log.lock().unwrap().close_calls += 1;
        if self.fail_close {
            return Err(OrchestratorError::ToolServer(
                "MCP session shutdown failed: task panicked".into(),
            ));
        }
        Ok(())
    }
}

/// Console fed from a fixed script; end of script reads as end of input.
#[derive(Default)]
pub struct ScriptedConsole {
    lines: VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, OrchestratorError> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn print(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}

/// Log lines captured from the current thread's `tracing` dispatcher.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Capture `relay` debug logs until the returned guard is dropped.
///
/// Scoped to the calling thread, so use it from `#[tokio::test]` on the
/// default current-thread runtime.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("relay=debug")
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
