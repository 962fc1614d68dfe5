//! Outbound messaging tool: lets the agent send a message to one of the
//! platforms it is connected to.

use async_trait::async_trait;
use memoh_core::error::{MessagingError, ToolError};
use memoh_core::messaging::{MessageSender, Platform, SendMessageOptions};
use memoh_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use tracing::debug;

pub struct SendMessageTool {
    sender: Arc<dyn MessageSender>,
    platforms: Vec<Platform>,
}

impl SendMessageTool {
    pub fn new(sender: Arc<dyn MessageSender>, platforms: Vec<Platform>) -> Self {
        Self { sender, platforms }
    }
}

#[async_trait]
impl Tool for SendMessageTool {
    fn name(&self) -> &str {
        "send-message"
    }

    fn description(&self) -> &str {
        "Send a message to the user on one of the available platforms."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let names: Vec<&str> = self.platforms.iter().map(|p| p.name.as_str()).collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "platform": {
                    "type": "string",
                    "enum": names,
                    "description": "The platform to send the message to"
                },
                "message": {
                    "type": "string",
                    "description": "The message to send"
                }
            },
            "required": ["platform", "message"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let platform = arguments["platform"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'platform' argument".into()))?;
        let message = arguments["message"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'message' argument".into()))?;

        if !self.platforms.iter().any(|p| p.name == platform) {
            return Err(ToolError::InvalidArguments(format!(
                "Unknown platform '{platform}'"
            )));
        }

        debug!(platform, "Sending outbound message");
        self.sender
            .send(
                platform,
                SendMessageOptions {
                    message: message.to_string(),
                },
            )
            .await
            .map_err(|e| match e {
                MessagingError::UnknownPlatform(p) => {
                    ToolError::InvalidArguments(format!("Unknown platform '{p}'"))
                }
                other => ToolError::ExecutionFailed {
                    tool_name: "send-message".into(),
                    reason: other.to_string(),
                },
            })?;

        Ok(ToolResult::text(format!("Message sent to {platform}.")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSender;

    fn tool(sender: Arc<RecordingSender>) -> SendMessageTool {
        SendMessageTool::new(
            sender,
            vec![Platform::new("telegram"), Platform::new("discord")],
        )
    }

    #[tokio::test]
    async fn sends_to_known_platform() {
        let sender = Arc::new(RecordingSender::default());
        let result = tool(sender.clone())
            .execute(serde_json::json!({ "platform": "telegram", "message": "Hi!" }))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(
            sender.sent().await,
            vec![("telegram".to_string(), "Hi!".to_string())]
        );
    }

    #[tokio::test]
    async fn rejects_unknown_platform() {
        let sender = Arc::new(RecordingSender::default());
        let err = tool(sender.clone())
            .execute(serde_json::json!({ "platform": "fax", "message": "Hi!" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(sender.sent().await.is_empty());
    }

    #[test]
    fn schema_enumerates_platforms() {
        let schema = tool(Arc::new(RecordingSender::default())).parameters_schema();
        assert_eq!(
            schema["properties"]["platform"]["enum"],
            serde_json::json!(["telegram", "discord"])
        );
    }
}
