//! Outbound messaging — delivering agent-initiated messages to a platform.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::MessagingError;

/// A platform the agent can reach (e.g., "telegram", "cli").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Platform {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// What to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageOptions {
    pub message: String,
}

/// The outbound messaging collaborator.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(
        &self,
        platform: &str,
        options: SendMessageOptions,
    ) -> std::result::Result<(), MessagingError>;
}
