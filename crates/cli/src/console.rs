//! Console delivery for the `send-message` tool.
//!
//! The terminal is the only platform the CLI can reach itself, so a
//! message for the client platform is printed; every other platform is
//! reported back to the model as unknown.

use async_trait::async_trait;
use memoh_agent::prompt::CLIENT_PLATFORM;
use memoh_core::error::MessagingError;
use memoh_core::{MessageSender, SendMessageOptions};
use std::io::Write;
use std::sync::Mutex;

pub struct ConsoleSender<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleSender<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSender<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap()
    }
}

#[async_trait]
impl<W: Write + Send> MessageSender for ConsoleSender<W> {
    async fn send(&self, platform: &str, options: SendMessageOptions) -> Result<(), MessagingError> {
        if platform != CLIENT_PLATFORM {
            return Err(MessagingError::UnknownPlatform(platform.to_string()));
        }

        let failed = |e: std::io::Error| MessagingError::DeliveryFailed {
            platform: platform.to_string(),
            reason: e.to_string(),
        };
        let mut out = self.out.lock().map_err(|_| MessagingError::DeliveryFailed {
            platform: platform.to_string(),
            reason: "console writer poisoned".into(),
        })?;
        writeln!(out, "  [message] {}", options.message).map_err(failed)?;
        out.flush().map_err(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(message: &str) -> SendMessageOptions {
        SendMessageOptions {
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn prints_client_messages() {
        let sender = ConsoleSender::new(Vec::new());
        sender.send("client", options("Reminder: stretch")).await.unwrap();
        let printed = String::from_utf8(sender.into_inner()).unwrap();
        assert_eq!(printed, "  [message] Reminder: stretch\n");
    }

    #[tokio::test]
    async fn rejects_other_platforms() {
        let sender = ConsoleSender::new(Vec::new());
        let err = sender.send("telegram", options("hi")).await.unwrap_err();
        assert!(matches!(err, MessagingError::UnknownPlatform(p) if p == "telegram"));
    }
}
