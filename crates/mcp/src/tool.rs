//! Exposing a remote tool through the [`Tool`] trait.

use crate::client::McpClient;
use crate::naming::tool_id;
use crate::protocol::RemoteToolDefinition;
use async_trait::async_trait;
use memoh_core::error::ToolError;
use memoh_core::{Tool, ToolResult};
use serde_json::Value;
use std::sync::Arc;

/// A tool served by an external tool server.
pub struct McpTool {
    id: String,
    remote_name: String,
    description: String,
    schema: Value,
    client: Arc<dyn McpClient>,
}

impl McpTool {
    pub fn new(client: Arc<dyn McpClient>, definition: RemoteToolDefinition) -> Self {
        let id = tool_id(client.server_name(), &definition.name);
        let description = definition
            .description
            .unwrap_or_else(|| format!("{} (from {})", definition.name, client.server_name()));
        Self {
            id,
            remote_name: definition.name,
            description,
            schema: definition.input_schema,
            client,
        }
    }

    /// The tool's name on its server.
    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }
}

#[async_trait]
impl Tool for McpTool {
    fn name(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let arguments = if arguments.is_null() {
            serde_json::json!({})
        } else {
            arguments
        };

        let result = self
            .client
            .call_tool(&self.remote_name, arguments)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.id.clone(),
                reason: e.to_string(),
            })?;

        let output = result.text();
        if result.is_error {
            return Err(ToolError::ExecutionFailed {
                tool_name: self.id.clone(),
                reason: output,
            });
        }

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: result.structured_content,
        })
    }
}
