//! A connection to one external tool server.

use crate::error::McpError;
use crate::protocol::{CallToolResult, ListToolsResult, RemoteToolDefinition, initialize_params};
use crate::transport::Transport;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// What the lifecycle needs from an open connection.
#[async_trait]
pub trait McpClient: Send + Sync {
    /// The configured server name.
    fn server_name(&self) -> &str;

    /// Tools the server advertises.
    async fn list_tools(&self) -> Result<Vec<RemoteToolDefinition>, McpError>;

    /// Invoke a tool by its server-side name.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError>;

    /// Release the connection. Called exactly once by the lifecycle.
    async fn close(&self) -> Result<(), McpError>;
}

/// An [`McpClient`] speaking JSON-RPC over any [`Transport`].
pub struct RpcClient {
    server: String,
    transport: Box<dyn Transport>,
}

impl RpcClient {
    /// Perform the `initialize` handshake over `transport`.
    ///
    /// On failure the transport is shut down before the error is returned.
    pub async fn connect(
        server: impl Into<String>,
        transport: Box<dyn Transport>,
    ) -> Result<Self, McpError> {
        let server = server.into();

        let handshake = async {
            let info = transport
                .request("initialize", Some(initialize_params()))
                .await?;
            debug!(
                server = %server,
                protocol = %info["protocolVersion"].as_str().unwrap_or("unknown"),
                "Tool server initialized"
            );
            transport
                .notify("notifications/initialized", None)
                .await
        };

        if let Err(e) = handshake.await {
            let _ = transport.shutdown().await;
            return Err(e);
        }

        Ok(Self { server, transport })
    }
}

#[async_trait]
impl McpClient for RpcClient {
    fn server_name(&self) -> &str {
        &self.server
    }

    async fn list_tools(&self) -> Result<Vec<RemoteToolDefinition>, McpError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let params = cursor
                .as_ref()
                .map(|c| serde_json::json!({ "cursor": c }));
            let page: ListToolsResult =
                serde_json::from_value(self.transport.request("tools/list", params).await?)?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if Some(&next) != cursor.as_ref() => cursor = Some(next),
                _ => break,
            }
        }
        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        let params = serde_json::json!({ "name": name, "arguments": arguments });
        let result = self.transport.request("tools/call", Some(params)).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn close(&self) -> Result<(), McpError> {
        self.transport.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Answers from a script of canned results, recording calls.
    #[derive(Default)]
    struct ScriptedTransport {
        results: Mutex<Vec<Result<Value, McpError>>>,
        methods: Arc<Mutex<Vec<String>>>,
        shutdowns: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
            self.methods
                .lock()
                .await
                .push(format!("{method} {}", params.unwrap_or(Value::Null)));
            let mut results = self.results.lock().await;
            if results.is_empty() {
                return Err(McpError::ConnectionClosed);
            }
            results.remove(0)
        }

        async fn notify(&self, method: &str, _params: Option<Value>) -> Result<(), McpError> {
            self.methods.lock().await.push(method.to_string());
            Ok(())
        }

        async fn shutdown(&self) -> Result<(), McpError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn scripted(results: Vec<Result<Value, McpError>>) -> ScriptedTransport {
        ScriptedTransport {
            results: Mutex::new(results),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn connect_handshakes_then_lists_pages() {
        let transport = scripted(vec![
            Ok(serde_json::json!({ "protocolVersion": "2024-11-05" })),
            Ok(serde_json::json!({ "tools": [{ "name": "a" }], "nextCursor": "p2" })),
            Ok(serde_json::json!({ "tools": [{ "name": "b" }] })),
        ]);
        let methods = transport.methods.clone();

        let client = RpcClient::connect("files", Box::new(transport)).await.unwrap();
        let tools = client.list_tools().await.unwrap();

        assert_eq!(tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        let methods = methods.lock().await;
        assert!(methods[0].starts_with("initialize"));
        assert_eq!(methods[1], "notifications/initialized");
        assert_eq!(methods[3], r#"tools/list {"cursor":"p2"}"#);
    }

    #[tokio::test]
    async fn failed_handshake_shuts_transport_down() {
        let transport = scripted(vec![Err(McpError::Timeout("slow".into()))]);
        let shutdowns = transport.shutdowns.clone();

        assert!(RpcClient::connect("slow", Box::new(transport)).await.is_err());
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn call_tool_parses_result() {
        let transport = scripted(vec![
            Ok(serde_json::json!({})),
            Ok(serde_json::json!({ "content": [{ "type": "text", "text": "hi" }] })),
        ]);
        let client = RpcClient::connect("echo", Box::new(transport)).await.unwrap();
        let result = client.call_tool("echo", serde_json::json!({ "text": "hi" })).await.unwrap();
        assert_eq!(result.text(), "hi");
    }
}
