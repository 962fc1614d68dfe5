//! Agent-level streaming events.
//!
//! `AgentStreamEvent` wraps provider-level stream chunks and tool dispatch
//! into the events a streaming caller observes, in generation order.

use memoh_core::provider::Usage;
use serde::{Deserialize, Serialize};

/// Events emitted by the agent during a streaming turn.
///
/// - `step_start`  — a reasoning step is about to call the model
/// - `chunk`       — partial text from the model
/// - `tool_call`   — the model asked for a tool
/// - `tool_result` — the tool finished
/// - `step_finish` — the step's tool results are all in
/// - `done`        — the turn is complete
/// - `error`       — the turn failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    StepStart { step: usize },

    /// Partial text token from the LLM.
    Chunk { content: String },

    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    ToolResult {
        id: String,
        name: String,
        output: String,
        success: bool,
    },

    StepFinish { step: usize },

    /// Final metadata for the turn.
    Done {
        steps: usize,
        messages: usize,
        /// The step bound was reached before a final answer
        truncated: bool,
        usage: Option<Usage>,
    },

    Error { message: String },
}

impl AgentStreamEvent {
    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StepStart { .. } => "step_start",
            Self::Chunk { .. } => "chunk",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::StepFinish { .. } => "step_finish",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_chunk() {
        let event = AgentStreamEvent::Chunk {
            content: "Hello".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"chunk""#));
        assert!(json.contains(r#""content":"Hello""#));
    }

    #[test]
    fn event_serialization_tool_call() {
        let event = AgentStreamEvent::ToolCall {
            id: "call_1".into(),
            name: "create-schedule".into(),
            input: serde_json::json!({"pattern": "0 9 * * *"}),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"tool_call""#));
        assert!(json.contains(r#""name":"create-schedule""#));
    }

    #[test]
    fn event_serialization_done() {
        let event = AgentStreamEvent::Done {
            steps: 2,
            messages: 4,
            truncated: false,
            usage: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"done""#));
        assert!(json.contains(r#""steps":2"#));
        assert_eq!(event.event_type(), "done");
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"step_start","step":3}"#;
        let event: AgentStreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, AgentStreamEvent::StepStart { step: 3 });
    }
}
