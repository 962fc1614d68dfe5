//! In-memory store, useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memoh_core::error::MemoryError;
use memoh_core::memory::{MemoryStore, MemoryUnit};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A memory store that keeps units in a Vec.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    units: Arc<RwLock<Vec<MemoryUnit>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `units`.
    pub fn with_units(units: Vec<MemoryUnit>) -> Self {
        Self {
            units: Arc::new(RwLock::new(units)),
        }
    }

    pub async fn len(&self) -> usize {
        self.units.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.units.read().await.is_empty()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn read(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MemoryUnit>, MemoryError> {
        Ok(crate::units_in_range(&self.units.read().await, from, to))
    }

    async fn search(&self, query: &str, owner_id: &str) -> Result<Vec<MemoryUnit>, MemoryError> {
        Ok(crate::rank_units(&self.units.read().await, query, owner_id))
    }

    async fn store(&self, unit: MemoryUnit) -> Result<(), MemoryError> {
        self.units.write().await.push(unit);
        Ok(())
    }
}
