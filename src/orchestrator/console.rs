//! Operator I/O.

use std::io::Write as _;

use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, BufReader, Stdin};

use crate::error::OrchestratorError;

/// Where the orchestrator reads operator input and prints status.
#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and wait for one line. `None` means end of input.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, OrchestratorError>;

    fn print(&mut self, text: &str);
}

/// Console over the process stdin/stdout.
pub struct StdConsole {
    stdin: BufReader<Stdin>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: BufReader::new(io::stdin()),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, OrchestratorError> {
        print!("{prompt}");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let count = self.stdin.read_line(&mut line).await?;
        if count == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print(&mut self, text: &str) {
        println!("{text}");
    }
}
