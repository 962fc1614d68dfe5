//! File-based memory store: persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `MemoryUnit`. Units are loaded into memory
//! on creation and appended to the file on every store, which gives fast
//! reads with durable writes.
//!
//! Storage location: `~/.memoh/memory.jsonl` unless configured otherwise.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memoh_core::error::MemoryError;
use memoh_core::memory::{MemoryStore, MemoryUnit};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed memory store using JSONL (one unit per line).
pub struct FileMemoryStore {
    path: PathBuf,
    units: Arc<RwLock<Vec<MemoryUnit>>>,
}

impl FileMemoryStore {
    /// Open the store at `path`.
    ///
    /// If the file exists, units are loaded from it. Otherwise the store
    /// starts empty and the file is created on first write.
    pub fn new(path: PathBuf) -> Self {
        let units = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = units.len(), "File memory store loaded");
        Self {
            path,
            units: Arc::new(RwLock::new(units)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Vec<MemoryUnit> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // File doesn't exist yet
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<MemoryUnit>(line) {
                Ok(unit) => Some(unit),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted memory unit");
                    None
                }
            })
            .collect()
    }

    fn append_to_disk(&self, unit: &MemoryUnit) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create memory directory: {e}"))
            })?;
        }

        let line = serde_json::to_string(unit)
            .map_err(|e| MemoryError::Storage(format!("Failed to serialize memory unit: {e}")))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MemoryError::Storage(format!("Failed to open memory file: {e}")))?;
        writeln!(file, "{line}")
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    fn name(&self) -> &str {
        "file"
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
        let mut units = self.units.write().await;
        self.append_to_disk(&unit)?;
        units.push(unit);
        Ok(())
    }
}
