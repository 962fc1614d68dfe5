//! Transports carrying JSON-RPC between the client and a tool server.
//!
//! - [`stdio`]: newline-delimited JSON over a spawned process's stdin/stdout
//! - [`http`]: streamable HTTP, one POST per request
//! - [`sse`]: a long-lived event stream for responses plus POSTs for requests

pub mod http;
pub mod sse;
pub mod stdio;

use crate::error::McpError;
use crate::protocol::JsonRpcResponse;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tracing::debug;

/// A bidirectional JSON-RPC channel to one server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for its result.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpError>;

    /// Send a notification (no response expected).
    async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError>;

    /// Release the underlying process or connection.
    async fn shutdown(&self) -> Result<(), McpError>;
}

type ResponseSender = oneshot::Sender<Result<Value, McpError>>;

/// Requests awaiting a response, for transports where responses arrive
/// on a separate reader task.
#[derive(Clone, Default)]
pub(crate) struct PendingRequests {
    next_id: Arc<AtomicI64>,
    waiting: Arc<Mutex<HashMap<i64, ResponseSender>>>,
}

impl PendingRequests {
    pub(crate) fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) async fn register(&self, id: i64) -> oneshot::Receiver<Result<Value, McpError>> {
        let (tx, rx) = oneshot::channel();
        self.waiting.lock().await.insert(id, tx);
        rx
    }

    pub(crate) async fn forget(&self, id: i64) {
        self.waiting.lock().await.remove(&id);
    }

    /// Hand a response to whoever is waiting for it.
    pub(crate) async fn resolve(&self, response: JsonRpcResponse) {
        let Some(id) = response.numeric_id() else {
            debug!("Ignoring response without numeric id");
            return;
        };
        if let Some(tx) = self.waiting.lock().await.remove(&id) {
            let _ = tx.send(response.into_result());
        }
    }

    /// Fail every outstanding request; the connection is gone.
    pub(crate) async fn close_all(&self) {
        for (_, tx) in self.waiting.lock().await.drain() {
            let _ = tx.send(Err(McpError::ConnectionClosed));
        }
    }

    pub(crate) async fn wait(
        &self,
        id: i64,
        rx: oneshot::Receiver<Result<Value, McpError>>,
        timeout: Duration,
    ) -> Result<Value, McpError> {
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(McpError::ConnectionClosed),
            Err(_) => {
                self.forget(id).await;
                Err(McpError::Timeout(format!("no response after {timeout:?}")))
            }
        }
    }
}

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

impl SseEvent {
    /// The event type, `message` when unnamed.
    pub fn kind(&self) -> &str {
        self.event.as_deref().unwrap_or("message")
    }
}

/// Incremental decoder for `text/event-stream` bodies.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: String,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Feed raw text and collect every event it completes.
    pub(crate) fn feed(&mut self, text: &str) -> Vec<SseEvent> {
        self.buffer.push_str(text);
        let mut events = Vec::new();

        while let Some(line_end) = self.buffer.find('\n') {
            let line = self.buffer[..line_end].trim_end_matches('\r').to_string();
            self.buffer.drain(..=line_end);

            if line.is_empty() {
                if !self.data.is_empty() || self.event.is_some() {
                    events.push(SseEvent {
                        event: self.event.take(),
                        data: std::mem::take(&mut self.data).join("\n"),
                    });
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
                None => (line.as_str(), ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        events
    }

    /// Flush a trailing event not terminated by a blank line.
    pub(crate) fn finish(&mut self) -> Option<SseEvent> {
        let mut events = self.feed("\n\n");
        events.pop()
    }
}
