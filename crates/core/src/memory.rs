//! Memory store trait — time-bounded recall of earlier turns.
//!
//! A memory unit is a timestamped batch of messages (usually one complete
//! turn). The agent reads units falling inside its context window before a
//! new turn and may search them on demand through the memory tool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::MemoryError;
use crate::message::Message;

/// A timestamped batch of messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUnit {
    /// When the batch was recorded
    pub timestamp: DateTime<Utc>,

    /// Messages in conversation order
    pub messages: Vec<Message>,

    /// Owner (user) of this memory, if scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl MemoryUnit {
    pub fn new(timestamp: DateTime<Utc>, messages: Vec<Message>) -> Self {
        Self {
            timestamp,
            messages,
            owner_id: None,
        }
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Whether `timestamp` lies inside the closed range `[from, to]`.
    pub fn within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.timestamp >= from && self.timestamp <= to
    }
}

/// The memory collaborator.
///
/// Implementations: in-memory (tests, ephemeral sessions), JSONL file.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The store name (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Units whose timestamp falls in `[from, to]`, oldest first.
    async fn read(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> std::result::Result<Vec<MemoryUnit>, MemoryError>;

    /// Units relevant to `query` for the given owner.
    async fn search(
        &self,
        query: &str,
        owner_id: &str,
    ) -> std::result::Result<Vec<MemoryUnit>, MemoryError>;

    /// Record a new unit.
    async fn store(&self, unit: MemoryUnit) -> std::result::Result<(), MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn within_is_inclusive_on_both_ends() {
        let now = Utc::now();
        let unit = MemoryUnit::new(now, vec![]);
        assert!(unit.within(now, now));
        assert!(unit.within(now - Duration::minutes(1), now));
        assert!(!unit.within(now + Duration::seconds(1), now + Duration::minutes(1)));
    }

    #[test]
    fn memory_unit_serialization_skips_missing_owner() {
        let unit = MemoryUnit::new(Utc::now(), vec![Message::user("I like tea")]);
        let json = serde_json::to_string(&unit).unwrap();
        assert!(json.contains("I like tea"));
        assert!(!json.contains("owner_id"));

        let owned = unit.with_owner("u1");
        let json = serde_json::to_string(&owned).unwrap();
        assert!(json.contains(r#""owner_id":"u1""#));
    }
}
