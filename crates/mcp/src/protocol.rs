//! The slice of the Model Context Protocol (JSON-RPC 2.0) the client uses:
//! `initialize`, `tools/list` and `tools/call`.

use crate::error::McpError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: i64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: i64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// The numeric request id this response answers, if it has one.
    pub fn numeric_id(&self) -> Option<i64> {
        match &self.id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Value, McpError> {
        match (self.error, self.result) {
            (Some(error), _) => Err(McpError::Server {
                code: error.code,
                message: error.message,
            }),
            (None, Some(result)) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}

/// A message arriving from the server.
#[derive(Debug, Clone)]
pub enum Incoming {
    Response(JsonRpcResponse),
    /// A notification or server-initiated request, identified by method
    Other { method: String },
}

/// Classify one decoded JSON value.
pub fn parse_incoming(value: Value) -> Result<Incoming, McpError> {
    if let Some(method) = value.get("method").and_then(Value::as_str) {
        return Ok(Incoming::Other {
            method: method.to_string(),
        });
    }
    if value.get("id").is_some() {
        return Ok(Incoming::Response(serde_json::from_value(value)?));
    }
    Err(McpError::Protocol(format!("Unrecognized message: {value}")))
}

/// Params for the `initialize` request.
pub fn initialize_params() -> Value {
    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {
            "name": "memoh",
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

/// A tool advertised by a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_object_schema")]
    pub input_schema: Value,
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<RemoteToolDefinition>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        resource: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<Content>,
    #[serde(default)]
    pub structured_content: Option<Value>,
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// All text content joined by newlines; other content is summarized.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                Content::Text { text } => Some(text.clone()),
                Content::Image { mime_type } => Some(format!("[image: {mime_type}]")),
                Content::Resource { resource } => resource
                    .get("uri")
                    .and_then(Value::as_str)
                    .map(|uri| format!("[resource: {uri}]")),
                Content::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_without_empty_params() {
        let json = serde_json::to_value(JsonRpcRequest::new(7, "tools/list", None)).unwrap();
        assert_eq!(json, serde_json::json!({ "jsonrpc": "2.0", "id": 7, "method": "tools/list" }));
    }

    #[test]
    fn classifies_responses_and_notifications() {
        let response = parse_incoming(serde_json::json!({
            "jsonrpc": "2.0", "id": 3, "result": { "tools": [] }
        }))
        .unwrap();
        match response {
            Incoming::Response(r) => assert_eq!(r.numeric_id(), Some(3)),
            other => panic!("expected response, got {other:?}"),
        }

        let notification = parse_incoming(serde_json::json!({
            "jsonrpc": "2.0", "method": "notifications/tools/list_changed"
        }))
        .unwrap();
        assert!(matches!(notification, Incoming::Other { .. }));

        assert!(parse_incoming(serde_json::json!({ "hello": 1 })).is_err());
    }

    #[test]
    fn error_response_maps_to_server_error() {
        let response: JsonRpcResponse = serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0", "id": 1, "error": { "code": -32601, "message": "Method not found" }
        }))
        .unwrap();
        assert!(matches!(
            response.into_result(),
            Err(McpError::Server { code: -32601, .. })
        ));
    }

    #[test]
    fn tool_definition_defaults_schema() {
        let list: ListToolsResult = serde_json::from_value(serde_json::json!({
            "tools": [{ "name": "read_file", "description": "Read a file" }, { "name": "ping" }]
        }))
        .unwrap();
        assert_eq!(list.tools.len(), 2);
        assert_eq!(list.tools[1].input_schema["type"], "object");
    }

    #[test]
    fn call_result_text_joins_content() {
        let result: CallToolResult = serde_json::from_value(serde_json::json!({
            "content": [
                { "type": "text", "text": "line one" },
                { "type": "image", "mimeType": "image/png", "data": "..." },
                { "type": "audio", "data": "..." },
                { "type": "text", "text": "line two" }
            ],
            "isError": false
        }))
        .unwrap();
        assert_eq!(result.text(), "line one\n[image: image/png]\nline two");
        assert!(!result.is_error);
    }
}
