//! Stdio transport: a spawned process speaking newline-delimited JSON-RPC.
//!
//! A writer task owns stdin and a reader task owns stdout, routing each
//! response to the request waiting for its id.

use super::{PendingRequests, Transport};
use crate::error::McpError;
use crate::protocol::{Incoming, JsonRpcNotification, JsonRpcRequest, parse_incoming};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

/// How long a process gets to exit after stdin closes before it is killed.
const EXIT_GRACE: Duration = Duration::from_secs(2);

/// How to start the server process.
#[derive(Debug, Clone)]
pub struct StdioCommand {
    pub server: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub cwd: Option<PathBuf>,
}

pub struct StdioTransport {
    server: String,
    writer: Mutex<Option<mpsc::Sender<String>>>,
    pending: PendingRequests,
    alive: Arc<AtomicBool>,
    child: Mutex<Child>,
    timeout: Duration,
}

impl StdioTransport {
    /// Spawn the process and start the reader/writer tasks.
    pub fn spawn(spec: &StdioCommand, timeout: Duration) -> Result<Self, McpError> {
        let mut cmd = Command::new(&spec.command);
        cmd.args(&spec.args)
            .envs(&spec.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd.spawn().map_err(|e| McpError::Spawn {
            server: spec.server.clone(),
            reason: format!("{}: {e}", spec.command),
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Transport("Failed to get stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::Transport("Failed to get stdout".into()))?;

        let alive = Arc::new(AtomicBool::new(true));
        let pending = PendingRequests::default();

        let (write_tx, mut write_rx) = mpsc::channel::<String>(256);
        let alive_writer = Arc::clone(&alive);
        let server = spec.server.clone();
        tokio::spawn(async move {
            while let Some(line) = write_rx.recv().await {
                let written = async {
                    stdin.write_all(line.as_bytes()).await?;
                    stdin.flush().await
                };
                if let Err(e) = written.await {
                    warn!(server = %server, error = %e, "Tool server stdin write failed");
                    alive_writer.store(false, Ordering::SeqCst);
                    break;
                }
            }
            // Dropping stdin here signals EOF to the process
        });

        let pending_reader = pending.clone();
        let alive_reader = Arc::clone(&alive);
        let server = spec.server.clone();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) if line.trim().is_empty() => {}
                    Ok(_) => match serde_json::from_str::<Value>(&line).map_err(McpError::from).and_then(parse_incoming) {
                        Ok(Incoming::Response(response)) => pending_reader.resolve(response).await,
                        Ok(Incoming::Other { method }) => {
                            debug!(server = %server, method = %method, "Ignoring server message");
                        }
                        Err(e) => {
                            warn!(server = %server, error = %e, "Unparseable tool server output");
                        }
                    },
                    Err(e) => {
                        warn!(server = %server, error = %e, "Tool server stdout read failed");
                        break;
                    }
                }
            }
            alive_reader.store(false, Ordering::SeqCst);
            pending_reader.close_all().await;
        });

        Ok(Self {
            server: spec.server.clone(),
            writer: Mutex::new(Some(write_tx)),
            pending,
            alive,
            child: Mutex::new(child),
            timeout,
        })
    }

    async fn write_line(&self, line: String) -> Result<(), McpError> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(McpError::ConnectionClosed);
        }
        let writer = self.writer.lock().await.clone().ok_or(McpError::ConnectionClosed)?;
        writer
            .send(line)
            .await
            .map_err(|_| McpError::ConnectionClosed)
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        let id = self.pending.next_id();
        let line = format!(
            "{}\n",
            serde_json::to_string(&JsonRpcRequest::new(id, method, params))?
        );

        let rx = self.pending.register(id).await;
        if let Err(e) = self.write_line(line).await {
            self.pending.forget(id).await;
            return Err(e);
        }
        self.pending.wait(id, rx, self.timeout).await
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        let line = format!(
            "{}\n",
            serde_json::to_string(&JsonRpcNotification::new(method, params))?
        );
        self.write_line(line).await
    }

    async fn shutdown(&self) -> Result<(), McpError> {
        // Closing the writer closes stdin, which asks the server to exit
        self.writer.lock().await.take();
        self.alive.store(false, Ordering::SeqCst);

        let mut child = self.child.lock().await;
        match tokio::time::timeout(EXIT_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(server = %self.server, %status, "Tool server exited");
                Ok(())
            }
            Ok(Err(e)) => Err(McpError::Transport(e.to_string())),
            Err(_) => {
                debug!(server = %self.server, "Tool server did not exit, killing");
                child
                    .kill()
                    .await
                    .map_err(|e| McpError::Transport(format!("Failed to kill process: {e}")))
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn script(body: &str) -> StdioCommand {
        StdioCommand {
            server: "test".into(),
            command: "sh".into(),
            args: vec!["-c".into(), body.into()],
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    #[tokio::test]
    async fn request_round_trip() {
        let transport = StdioTransport::spawn(
            &script(r#"read line; echo '{"jsonrpc":"2.0","id":1,"result":{"ok":true}}'; cat > /dev/null"#),
            Duration::from_secs(5),
        )
        .unwrap();

        let result = transport.request("ping", None).await.unwrap();
        assert_eq!(result["ok"], true);
        transport.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn missing_command_fails_to_spawn() {
        let spec = StdioCommand {
            command: "/definitely/not/a/real/binary".into(),
            ..script("")
        };
        assert!(matches!(
            StdioTransport::spawn(&spec, Duration::from_secs(1)),
            Err(McpError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn process_exit_fails_pending_requests() {
        let transport = StdioTransport::spawn(&script("read line; exit 0"), Duration::from_secs(5)).unwrap();
        assert!(transport.request("ping", None).await.is_err());
        transport.shutdown().await.unwrap();
    }
}
