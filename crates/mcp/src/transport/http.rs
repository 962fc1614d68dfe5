//! Streamable HTTP transport: every JSON-RPC message is a POST.
//!
//! The server answers with either a JSON body (a single response or a
//! batch) or a short `text/event-stream` carrying the response. A session
//! id handed out on `initialize` is echoed on every later request.

use super::{SseDecoder, Transport};
use crate::error::McpError;
use crate::protocol::{Incoming, JsonRpcNotification, JsonRpcRequest, parse_incoming};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

const SESSION_HEADER: &str = "mcp-session-id";

pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
    next_id: AtomicI64,
    session_id: RwLock<Option<String>>,
}

impl HttpTransport {
    pub fn new(
        endpoint: impl Into<String>,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, McpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(header_map(headers)?)
            .build()
            .map_err(|e| McpError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
            next_id: AtomicI64::new(1),
            session_id: RwLock::new(None),
        })
    }

    async fn post(&self, body: &impl serde::Serialize) -> Result<reqwest::Response, McpError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json, text/event-stream")
            .json(body);
        if let Some(session) = self.session_id.read().await.as_deref() {
            request = request.header(SESSION_HEADER, session);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Transport(format!("HTTP error: {status} - {body}")));
        }

        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            *self.session_id.write().await = Some(session.to_string());
        }

        Ok(response)
    }
}

/// Build a header map from configured headers.
pub(crate) fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, McpError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| McpError::Transport(format!("Invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| McpError::Transport(format!("Invalid header value for '{name}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Find the response to `request_id` in a POST response body.
pub(crate) fn decode_response_body(
    content_type: &str,
    body: &str,
    request_id: i64,
) -> Result<Value, McpError> {
    let values: Vec<Value> = if content_type.starts_with("text/event-stream") {
        let mut decoder = SseDecoder::default();
        let mut events = decoder.feed(body);
        events.extend(decoder.finish());
        events
            .into_iter()
            .filter(|e| e.kind() == "message" && !e.data.is_empty())
            .map(|e| serde_json::from_str(&e.data))
            .collect::<Result<_, _>>()?
    } else {
        match serde_json::from_str::<Value>(body)? {
            Value::Array(items) => items,
            other => vec![other],
        }
    };

    for value in values {
        if let Incoming::Response(response) = parse_incoming(value)? {
            if response.numeric_id() == Some(request_id) {
                return response.into_result();
            }
        }
    }

    Err(McpError::Protocol(format!(
        "Missing response for request id {request_id}"
    )))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let response = self.post(&JsonRpcRequest::new(id, method, params)).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let body = response.text().await?;

        decode_response_body(&content_type, &body, id)
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        self.post(&JsonRpcNotification::new(method, params)).await?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), McpError> {
        let Some(session) = self.session_id.write().await.take() else {
            return Ok(());
        };
        debug!(endpoint = %self.endpoint, "Ending tool server session");
        self.client
            .delete(&self.endpoint)
            .header(SESSION_HEADER, session)
            .send()
            .await?;
        Ok(())
    }
}
