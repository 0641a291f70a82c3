//! Tool descriptors reported by an MCP server.

use serde::{Deserialize, Serialize};

use crate::provider::ToolDefinition;

/// A tool as listed by the server. Fetched fresh on every listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPToolSchema {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
}

impl MCPToolSchema {
    /// Catalog entry sent to the inference endpoint.
    pub fn to_tool_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            input_schema: self.input_schema.clone(),
        }
    }
}
