//! Domain event system — observing a session without coupling to it.
//!
//! The orchestration loop and the external-server lifecycle publish events
//! here; hosts subscribe to log, meter, or test what happened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A tool was executed
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A skill became enabled for the session
    SkillEnabled {
        skill: String,
        timestamp: DateTime<Utc>,
    },

    /// An external tool server connection reached the open state
    ExternalServerOpened {
        server: String,
        tools: usize,
        timestamp: DateTime<Utc>,
    },

    /// An external tool server connection was closed
    ExternalServerClosed {
        server: String,
        clean: bool,
        timestamp: DateTime<Utc>,
    },

    /// A schedule fired and was handed to the agent
    ScheduleTriggered {
        schedule_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A turn finished (successfully or not)
    TurnCompleted {
        steps: usize,
        messages: usize,
        success: bool,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::SkillEnabled {
            skill: "cook".into(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::SkillEnabled { skill, .. } => assert_eq!(skill, "cook"),
            _ => panic!("Expected SkillEnabled event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::TurnCompleted {
            steps: 1,
            messages: 2,
            success: true,
            timestamp: Utc::now(),
        });
    }
}
