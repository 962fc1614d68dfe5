//! Memory store implementations for Memoh.
//!
//! Both stores keep units in timestamp order and share the same keyword
//! ranking, so tests against the in-memory store describe the file store
//! too.

pub mod file_backend;
pub mod in_memory;
pub mod raw;

pub use file_backend::FileMemoryStore;
pub use in_memory::InMemoryStore;
pub use raw::{raw_memory, raw_messages};

use chrono::{DateTime, Utc};
use memoh_core::memory::MemoryUnit;

/// Units in `[from, to]`, oldest first.
pub(crate) fn units_in_range(
    units: &[MemoryUnit],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<MemoryUnit> {
    let mut found: Vec<MemoryUnit> = units.iter().filter(|u| u.within(from, to)).cloned().collect();
    found.sort_by_key(|u| u.timestamp);
    found
}

/// Units visible to `owner_id` that mention any query term, best match
/// first. Unowned units are visible to everyone.
pub(crate) fn rank_units(units: &[MemoryUnit], query: &str, owner_id: &str) -> Vec<MemoryUnit> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &MemoryUnit)> = units
        .iter()
        .filter(|u| u.owner_id.as_deref().is_none_or(|o| o == owner_id))
        .filter_map(|u| {
            let text = u
                .messages
                .iter()
                .map(|m| m.content.to_lowercase())
                .collect::<Vec<_>>()
                .join("\n");
            let score: usize = terms.iter().map(|t| text.matches(t.as_str()).count()).sum();
            (score > 0).then_some((score, u))
        })
        .collect();

    // Higher score first, then newer first
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.timestamp.cmp(&a.1.timestamp)));
    scored.into_iter().map(|(_, u)| u.clone()).collect()
}
