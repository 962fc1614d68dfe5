//! Context loading — stored memory merged into history before a turn.

use chrono::{DateTime, Duration, Utc};
use memoh_core::{Conversation, MemoryStore};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the context window from the memory store.
#[derive(Clone)]
pub struct ContextLoader {
    store: Option<Arc<dyn MemoryStore>>,
    window_minutes: i64,
}

impl ContextLoader {
    pub fn new(store: Option<Arc<dyn MemoryStore>>, window_minutes: i64) -> Self {
        Self {
            store,
            window_minutes: window_minutes.max(0),
        }
    }

    pub fn window_minutes(&self) -> i64 {
        self.window_minutes
    }

    /// Append the messages of every unit in `[now - window, now]` to
    /// `conversation`, oldest unit first. Returns how many messages were
    /// appended.
    ///
    /// Units at or before the conversation's watermark were loaded by an
    /// earlier call and are skipped, as are units whose messages the
    /// conversation already holds (turns this session stored itself). A
    /// missing store, an empty range, or a failed read appends nothing.
    pub async fn load(&self, conversation: &mut Conversation, now: DateTime<Utc>) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };

        let from = now - Duration::minutes(self.window_minutes);
        let units = match store.read(from, now).await {
            Ok(units) => units,
            Err(e) => {
                warn!(store = store.name(), error = %e, "Failed to read context window");
                return 0;
            }
        };

        let watermark = conversation.context_watermark;
        let known: HashSet<&str> = conversation.messages.iter().map(|m| m.id.as_str()).collect();
        let mut units: Vec<_> = units
            .into_iter()
            .filter(|u| watermark.is_none_or(|w| u.timestamp > w))
            .filter(|u| !u.messages.first().is_some_and(|m| known.contains(m.id.as_str())))
            .collect();
        drop(known);
        units.sort_by_key(|u| u.timestamp);

        let messages: Vec<_> = units.into_iter().flat_map(|u| u.messages).collect();
        let count = messages.len();
        conversation.extend(messages);
        conversation.context_watermark = Some(watermark.map_or(now, |w| w.max(now)));

        debug!(messages = count, window_minutes = self.window_minutes, "Loaded context");
        count
    }
}
