//! Memory search tool: lets the agent search its stored conversations on
//! demand, beyond what the context window already loaded.

use async_trait::async_trait;
use memoh_core::error::ToolError;
use memoh_core::memory::MemoryStore;
use memoh_core::tool::{Tool, ToolResult};
use memoh_memory::raw_memory;
use std::sync::Arc;

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 20;

/// Searches the memory store on behalf of one owner.
pub struct MemorySearchTool {
    store: Arc<dyn MemoryStore>,
    owner_id: String,
    locale: String,
}

impl MemorySearchTool {
    pub fn new(store: Arc<dyn MemoryStore>, owner_id: impl Into<String>) -> Self {
        Self {
            store,
            owner_id: owner_id.into(),
            locale: "en-US".into(),
        }
    }

    /// Locale used for the date/time headers of returned memories.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

#[async_trait]
impl Tool for MemorySearchTool {
    fn name(&self) -> &str {
        "search-memory"
    }

    fn description(&self) -> &str {
        "Search your memory of past conversations with this user. \
         Use this when you need to recall something you were told before."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Keywords to look for"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of memories to return (default 5)",
                    "default": DEFAULT_LIMIT
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let limit = arguments["limit"]
            .as_u64()
            .map_or(DEFAULT_LIMIT, |l| l as usize)
            .clamp(1, MAX_LIMIT);

        let units = self
            .store
            .search(query, &self.owner_id)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        if units.is_empty() {
            return Ok(ToolResult::text(format!("No memories found matching '{query}'.")));
        }

        let output = units
            .iter()
            .take(limit)
            .map(|u| raw_memory(u, &self.locale))
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut result = ToolResult::text(output);
        result.data = Some(serde_json::json!({ "count": units.len().min(limit) }));
        Ok(result)
    }
}
