//! External tool-server connection specs.
//!
//! A spec says how to reach a tool server; `memoh-mcp` turns it into a live
//! connection. Specs with a transport tag this build does not know are
//! kept as [`ExternalServerSpec::Unsupported`] so a config written for a
//! newer version still loads, and are skipped at launch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExternalServerSpec {
    /// Streamable HTTP: each JSON-RPC request is a POST to `url`
    Http {
        name: String,
        url: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },

    /// Server-sent events: responses arrive on a long-lived GET stream
    Sse {
        name: String,
        url: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },

    /// A spawned process speaking JSON-RPC over stdin/stdout
    Stdio {
        name: String,
        command: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<PathBuf>,
    },

    #[serde(other)]
    Unsupported,
}

impl ExternalServerSpec {
    /// The server name, if the transport is known.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Http { name, .. } | Self::Sse { name, .. } | Self::Stdio { name, .. } => {
                Some(name)
            }
            Self::Unsupported => None,
        }
    }

    /// The transport tag.
    pub fn transport(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Sse { .. } => "sse",
            Self::Stdio { .. } => "stdio",
            Self::Unsupported => "unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stdio_spec() {
        let spec: ExternalServerSpec = serde_json::from_value(serde_json::json!({
            "type": "stdio",
            "name": "files",
            "command": "mcp-files",
            "args": ["--root", "/data"],
            "env": { "LOG": "warn" }
        }))
        .unwrap();
        assert_eq!(spec.name(), Some("files"));
        assert_eq!(spec.transport(), "stdio");
        match spec {
            ExternalServerSpec::Stdio { args, cwd, .. } => {
                assert_eq!(args, vec!["--root", "/data"]);
                assert!(cwd.is_none());
            }
            other => panic!("expected stdio, got {other:?}"),
        }
    }

    #[test]
    fn unknown_transport_tag_is_unsupported() {
        let spec: ExternalServerSpec = serde_json::from_value(serde_json::json!({
            "type": "websocket",
            "name": "ws",
            "url": "ws://localhost:9000"
        }))
        .unwrap();
        assert_eq!(spec, ExternalServerSpec::Unsupported);
        assert!(spec.name().is_none());
    }

    #[test]
    fn http_headers_default_empty() {
        let spec: ExternalServerSpec = serde_json::from_value(serde_json::json!({
            "type": "http",
            "name": "search",
            "url": "http://localhost:8080/mcp"
        }))
        .unwrap();
        match spec {
            ExternalServerSpec::Http { headers, .. } => assert!(headers.is_empty()),
            other => panic!("expected http, got {other:?}"),
        }
    }
}
