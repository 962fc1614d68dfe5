//! Turning connection specs into live clients.

use crate::client::{McpClient, RpcClient};
use crate::error::McpError;
use crate::transport::Transport;
use crate::transport::http::HttpTransport;
use crate::transport::sse::SseTransport;
use crate::transport::stdio::{StdioCommand, StdioTransport};
use async_trait::async_trait;
use memoh_core::ExternalServerSpec;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Opens a connection for one spec.
///
/// `Ok(None)` means the spec names a transport this launcher does not
/// handle; the caller skips it.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(
        &self,
        spec: &ExternalServerSpec,
    ) -> Result<Option<Arc<dyn McpClient>>, McpError>;
}

/// The launcher for the stdio, HTTP, and SSE transports.
#[derive(Debug, Clone)]
pub struct TransportLauncher {
    timeout: Duration,
}

impl TransportLauncher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TransportLauncher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl Launcher for TransportLauncher {
    async fn launch(
        &self,
        spec: &ExternalServerSpec,
    ) -> Result<Option<Arc<dyn McpClient>>, McpError> {
        let (name, transport): (&str, Box<dyn Transport>) = match spec {
            ExternalServerSpec::Stdio {
                name,
                command,
                args,
                env,
                cwd,
            } => {
                let command = StdioCommand {
                    server: name.clone(),
                    command: command.clone(),
                    args: args.clone(),
                    env: env.clone(),
                    cwd: cwd.clone(),
                };
                (name, Box::new(StdioTransport::spawn(&command, self.timeout)?))
            }
            ExternalServerSpec::Http { name, url, headers } => {
                (name, Box::new(HttpTransport::new(url.as_str(), headers, self.timeout)?))
            }
            ExternalServerSpec::Sse { name, url, headers } => (
                name,
                Box::new(SseTransport::connect(url, headers, self.timeout).await?),
            ),
            ExternalServerSpec::Unsupported => {
                warn!("Skipping tool server with unsupported transport");
                return Ok(None);
            }
        };

        let client = RpcClient::connect(name, transport).await?;
        Ok(Some(Arc::new(client)))
    }
}
