//! SSE transport: responses arrive on a long-lived event stream.
//!
//! The client opens a GET stream; the server's first `endpoint` event
//! names the URL requests are POSTed to. Responses come back as `message`
//! events and are routed to the waiting request by id.

use super::http::header_map;
use super::{PendingRequests, SseDecoder, Transport};
use crate::error::McpError;
use crate::protocol::{Incoming, JsonRpcNotification, JsonRpcRequest, parse_incoming};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct SseTransport {
    post_url: String,
    client: reqwest::Client,
    pending: PendingRequests,
    reader: JoinHandle<()>,
    timeout: Duration,
}

impl SseTransport {
    /// Open the event stream and wait for the server's endpoint event.
    pub async fn connect(
        url: &str,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, McpError> {
        let client = reqwest::Client::builder()
            .default_headers(header_map(headers)?)
            .build()
            .map_err(|e| McpError::Transport(format!("Failed to create HTTP client: {e}")))?;

        let base = reqwest::Url::parse(url)
            .map_err(|e| McpError::Transport(format!("Invalid URL '{url}': {e}")))?;

        let response = tokio::time::timeout(
            timeout,
            client.get(base.clone()).header("Accept", "text/event-stream").send(),
        )
        .await
        .map_err(|_| McpError::Timeout(format!("connecting to {url}")))??;

        if !response.status().is_success() {
            return Err(McpError::Transport(format!(
                "HTTP error opening event stream: {}",
                response.status()
            )));
        }

        let pending = PendingRequests::default();
        let (endpoint_tx, endpoint_rx) = oneshot::channel::<String>();
        let reader = tokio::spawn(read_events(response, pending.clone(), endpoint_tx));

        let endpoint = match tokio::time::timeout(timeout, endpoint_rx).await {
            Ok(Ok(endpoint)) => endpoint,
            Ok(Err(_)) => {
                reader.abort();
                return Err(McpError::Protocol("Event stream closed before endpoint event".into()));
            }
            Err(_) => {
                reader.abort();
                return Err(McpError::Timeout("waiting for endpoint event".into()));
            }
        };

        let post_url = base
            .join(&endpoint)
            .map_err(|e| McpError::Protocol(format!("Invalid endpoint '{endpoint}': {e}")))?;
        debug!(url = %post_url, "SSE endpoint received");

        Ok(Self {
            post_url: post_url.to_string(),
            client,
            pending,
            reader,
            timeout,
        })
    }

    async fn post(&self, body: &impl serde::Serialize) -> Result<(), McpError> {
        if self.reader.is_finished() {
            return Err(McpError::ConnectionClosed);
        }
        let response = self
            .client
            .post(&self.post_url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Transport(format!("HTTP error: {status} - {body}")));
        }
        Ok(())
    }
}

async fn read_events(
    response: reqwest::Response,
    pending: PendingRequests,
    endpoint_tx: oneshot::Sender<String>,
) {
    let mut endpoint_tx = Some(endpoint_tx);
    let mut decoder = SseDecoder::default();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let bytes = match chunk {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "Event stream interrupted");
                break;
            }
        };

        for event in decoder.feed(&String::from_utf8_lossy(&bytes)) {
            match event.kind() {
                "endpoint" => {
                    if let Some(tx) = endpoint_tx.take() {
                        let _ = tx.send(event.data.trim().to_string());
                    }
                }
                "message" => {
                    let parsed = serde_json::from_str::<Value>(&event.data)
                        .map_err(McpError::from)
                        .and_then(parse_incoming);
                    match parsed {
                        Ok(Incoming::Response(response)) => pending.resolve(response).await,
                        Ok(Incoming::Other { method }) => {
                            debug!(method = %method, "Ignoring server message");
                        }
                        Err(e) => warn!(error = %e, "Unparseable event"),
                    }
                }
                other => debug!(event = other, "Ignoring event"),
            }
        }
    }

    pending.close_all().await;
}

#[async_trait]
impl Transport for SseTransport {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        let id = self.pending.next_id();
        let rx = self.pending.register(id).await;
        if let Err(e) = self.post(&JsonRpcRequest::new(id, method, params)).await {
            self.pending.forget(id).await;
            return Err(e);
        }
        self.pending.wait(id, rx, self.timeout).await
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        self.post(&JsonRpcNotification::new(method, params)).await
    }

    async fn shutdown(&self) -> Result<(), McpError> {
        self.reader.abort();
        self.pending.close_all().await;
        Ok(())
    }
}

impl Drop for SseTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
