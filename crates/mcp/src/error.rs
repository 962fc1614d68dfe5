//! Errors raised while talking to an external tool server.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Failed to start server '{server}': {reason}")]
    Spawn { server: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server returned error {code}: {message}")]
    Server { code: i64, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for McpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            McpError::Timeout(e.to_string())
        } else {
            McpError::Transport(e.to_string())
        }
    }
}
