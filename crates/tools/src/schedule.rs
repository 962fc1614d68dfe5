//! Schedule tools: let the model create, list and remove recurring
//! triggers in the caller's schedule store.

use async_trait::async_trait;
use memoh_core::error::{ScheduleError, ToolError};
use memoh_core::schedule::{NewSchedule, ScheduleStore};
use memoh_core::tool::{Tool, ToolResult};
use std::sync::Arc;

fn store_error(tool_name: &str, e: ScheduleError) -> ToolError {
    match e {
        ScheduleError::InvalidPattern { .. } | ScheduleError::NotFound(_) => {
            ToolError::InvalidArguments(e.to_string())
        }
        ScheduleError::Storage(reason) => ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason,
        },
    }
}

pub struct CreateScheduleTool {
    store: Arc<dyn ScheduleStore>,
}

impl CreateScheduleTool {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CreateScheduleTool {
    fn name(&self) -> &str {
        "create-schedule"
    }

    fn description(&self) -> &str {
        "Create a recurring schedule. When it fires, you receive its command as an instruction."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Short name of the schedule"
                },
                "description": {
                    "type": "string",
                    "description": "What the schedule is for"
                },
                "pattern": {
                    "type": "string",
                    "description": "Cron expression with five fields: minute hour day-of-month month day-of-week"
                },
                "max_calls": {
                    "type": "integer",
                    "description": "Stop after this many runs; omit for no limit",
                    "minimum": 1
                },
                "command": {
                    "type": "string",
                    "description": "The instruction to carry out each time the schedule fires"
                }
            },
            "required": ["name", "pattern", "command"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let spec: NewSchedule = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let schedule = self
            .store
            .create(spec)
            .await
            .map_err(|e| store_error(self.name(), e))?;

        let data = serde_json::to_value(&schedule)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;
        Ok(ToolResult::json(data))
    }
}

pub struct ListSchedulesTool {
    store: Arc<dyn ScheduleStore>,
}

impl ListSchedulesTool {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListSchedulesTool {
    fn name(&self) -> &str {
        "list-schedules"
    }

    fn description(&self) -> &str {
        "List all schedules with their IDs, patterns and commands."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let schedules = self
            .store
            .list()
            .await
            .map_err(|e| store_error(self.name(), e))?;

        if schedules.is_empty() {
            return Ok(ToolResult::text("No schedules."));
        }

        let data = serde_json::to_value(&schedules)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;
        Ok(ToolResult::json(data))
    }
}

pub struct RemoveScheduleTool {
    store: Arc<dyn ScheduleStore>,
}

impl RemoveScheduleTool {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RemoveScheduleTool {
    fn name(&self) -> &str {
        "remove-schedule"
    }

    fn description(&self) -> &str {
        "Remove a schedule by its ID."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "ID of the schedule to remove"
                }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let id = arguments["id"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'id' argument".into()))?;

        self.store
            .remove(id)
            .await
            .map_err(|e| store_error(self.name(), e))?;

        Ok(ToolResult::text(format!("Schedule {id} removed.")))
    }
}

/// The three schedule tools over one store.
pub fn schedule_tools(store: Arc<dyn ScheduleStore>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(CreateScheduleTool::new(store.clone())),
        Arc::new(ListSchedulesTool::new(store.clone())),
        Arc::new(RemoveScheduleTool::new(store)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryScheduleStore;

    #[tokio::test]
    async fn create_list_remove() {
        let store = Arc::new(MemoryScheduleStore::default());
        let tools = schedule_tools(store.clone());
        let (create, list, remove) = (&tools[0], &tools[1], &tools[2]);

        let created = create
            .execute(serde_json::json!({
                "name": "water",
                "pattern": "*/30 * * * *",
                "max_calls": 3,
                "command": "Remind me to drink water"
            }))
            .await
            .unwrap();
        let id = created.data.unwrap()["id"].as_str().unwrap().to_string();

        let listed = list.execute(serde_json::json!({})).await.unwrap();
        assert!(listed.output.contains("Remind me to drink water"));

        remove.execute(serde_json::json!({ "id": id })).await.unwrap();
        let listed = list.execute(serde_json::json!({})).await.unwrap();
        assert_eq!(listed.output, "No schedules.");
    }

    #[tokio::test]
    async fn create_requires_command() {
        let tool = CreateScheduleTool::new(Arc::new(MemoryScheduleStore::default()));
        let err = tool
            .execute(serde_json::json!({ "name": "x", "pattern": "* * * * *" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn removing_unknown_id_is_invalid_arguments() {
        let tool = RemoveScheduleTool::new(Arc::new(MemoryScheduleStore::default()));
        let err = tool
            .execute(serde_json::json!({ "id": "nope" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
