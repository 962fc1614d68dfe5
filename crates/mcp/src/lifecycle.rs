//! Opening, discovering, and releasing the external tool servers of a turn.
//!
//! A turn calls [`McpConnections::launch`] once, builds its tool registry
//! from [`McpConnections::discover`], and hands the connections back to
//! [`McpConnections::close_all`] when the reasoning loop ends. Every
//! connection that opened is closed exactly once, whether the turn
//! succeeded or not.

use crate::client::McpClient;
use crate::launcher::Launcher;
use crate::protocol::RemoteToolDefinition;
use crate::tool::McpTool;
use chrono::Utc;
use futures::future::join_all;
use memoh_core::{DomainEvent, EventBus, ExternalServerSpec, Tool, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One open connection and the tools it advertised when it opened.
struct Connection {
    client: Arc<dyn McpClient>,
    tools: Vec<RemoteToolDefinition>,
}

/// The open connections of one turn.
#[derive(Default)]
pub struct McpConnections {
    connections: Vec<Connection>,
    events: Option<Arc<EventBus>>,
}

impl McpConnections {
    /// No connections. Closing this is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Open every spec concurrently and keep the ones that succeed.
    ///
    /// Specs the launcher does not handle and specs that fail to open are
    /// dropped with a warning.
    pub async fn launch(
        launcher: &dyn Launcher,
        specs: &[ExternalServerSpec],
        events: Option<Arc<EventBus>>,
    ) -> Self {
        let attempts = specs.iter().map(|spec| async move {
            let label = spec.name().unwrap_or("<unnamed>");
            let client = match launcher.launch(spec).await {
                Ok(Some(client)) => client,
                Ok(None) => return None,
                Err(e) => {
                    warn!(
                        server = %label,
                        transport = spec.transport(),
                        error = %e,
                        "Failed to open tool server, skipping"
                    );
                    return None;
                }
            };

            let tools = match client.list_tools().await {
                Ok(tools) => tools,
                Err(e) => {
                    warn!(server = %client.server_name(), error = %e, "Tool discovery failed");
                    Vec::new()
                }
            };
            Some(Connection { client, tools })
        });

        let connections: Vec<Connection> = join_all(attempts).await.into_iter().flatten().collect();

        for conn in &connections {
            info!(
                server = %conn.client.server_name(),
                tools = conn.tools.len(),
                "Tool server connected"
            );
            if let Some(bus) = &events {
                bus.publish(DomainEvent::ExternalServerOpened {
                    server: conn.client.server_name().to_string(),
                    tools: conn.tools.len(),
                    timestamp: Utc::now(),
                });
            }
        }

        Self {
            connections,
            events,
        }
    }

    /// Names of the open servers, in spec order.
    pub fn server_names(&self) -> Vec<&str> {
        self.connections
            .iter()
            .map(|c| c.client.server_name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Every advertised tool, registered under its `mcp__server__tool` id.
    pub fn discover(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for conn in &self.connections {
            for definition in &conn.tools {
                let tool = McpTool::new(Arc::clone(&conn.client), definition.clone());
                debug!(
                    server = %conn.client.server_name(),
                    tool = %tool.name(),
                    "Discovered remote tool"
                );
                registry.register(Arc::new(tool));
            }
        }
        registry
    }

    /// Close every connection concurrently.
    ///
    /// Close failures are logged and swallowed so one broken server cannot
    /// keep the others open.
    pub async fn close_all(mut self) {
        let connections = std::mem::take(&mut self.connections);
        close_connections(connections, self.events.clone()).await;
    }
}

async fn close_connections(connections: Vec<Connection>, events: Option<Arc<EventBus>>) {
    let closes = connections.into_iter().map(|conn| {
        let events = events.clone();
        async move {
            let server = conn.client.server_name().to_string();
            let clean = match conn.client.close().await {
                Ok(()) => {
                    debug!(server = %server, "Tool server closed");
                    true
                }
                Err(e) => {
                    warn!(server = %server, error = %e, "Failed to close tool server");
                    false
                }
            };
            if let Some(bus) = events {
                bus.publish(DomainEvent::ExternalServerClosed {
                    server,
                    clean,
                    timestamp: Utc::now(),
                });
            }
        }
    });
    join_all(closes).await;
}

impl Drop for McpConnections {
    fn drop(&mut self) {
        if self.connections.is_empty() {
            return;
        }
        let connections = std::mem::take(&mut self.connections);
        warn!(
            count = connections.len(),
            "Tool server connections dropped without close_all"
        );
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(close_connections(connections, self.events.take()));
        }
    }
}
