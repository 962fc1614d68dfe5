//! Plain-text rendering of stored turns.
//!
//! Memory units are shown to the model as a short transcript with the
//! assistant speaking as "You", preceded by a date/time header.

use memoh_core::locale::{format_date, format_time};
use memoh_core::memory::MemoryUnit;
use memoh_core::message::{Message, Role};

/// Render messages as a transcript. System messages are omitted.
pub fn raw_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .filter_map(|m| match m.role {
            Role::User => Some(format!("User: {}", m.content)),
            Role::Assistant => {
                let parts: Vec<String> = std::iter::once(m.content.clone())
                    .filter(|c| !c.is_empty())
                    .chain(m.tool_calls.iter().map(|tc| format!("[Tool Call: {}]", tc.name)))
                    .collect();
                Some(format!("You: {}", parts.join("\n")))
            }
            Role::Tool => Some(format!("Tool Result: {}", m.content)),
            Role::System => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render a memory unit with its date/time header.
pub fn raw_memory(unit: &MemoryUnit, locale: &str) -> String {
    format!(
        "---\ndate: {}\ntime: {}\ntimezone: UTC\n---\n{}",
        format_date(&unit.timestamp, locale),
        format_time(&unit.timestamp, locale),
        raw_messages(&unit.messages),
    )
}
