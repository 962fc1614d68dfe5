//! # Memoh MCP
//!
//! Connections to external tool servers speaking the Model Context
//! Protocol. Three transports are supported:
//! - **stdio**: a spawned process, newline-delimited JSON-RPC over its
//!   standard streams
//! - **http**: streamable HTTP, one POST per request
//! - **sse**: a long-lived event stream for responses, POSTs for requests
//!
//! [`McpConnections`] owns the connections of one turn: launch them in
//! parallel, expose their tools as a [`memoh_core::ToolRegistry`], and
//! close every one of them when the turn ends.

pub mod client;
pub mod error;
pub mod launcher;
pub mod lifecycle;
pub mod naming;
pub mod protocol;
pub mod tool;
pub mod transport;

pub use client::{McpClient, RpcClient};
pub use error::McpError;
pub use launcher::{Launcher, TransportLauncher};
pub use lifecycle::McpConnections;
pub use naming::{sanitize_component, tool_id};
pub use tool::McpTool;
pub use transport::Transport;
