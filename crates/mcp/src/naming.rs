//! Tool identifiers for remote tools.
//!
//! A remote tool is exposed to the model as `mcp__<server>__<tool>`, with
//! both components reduced to `[A-Za-z0-9_]` so the id is accepted by
//! every chat gateway.

const PREFIX: &str = "mcp";

/// Replace runs of characters outside `[A-Za-z0-9]` with a single `_`.
pub fn sanitize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_underscore = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The id under which a server's tool is registered.
pub fn tool_id(server: &str, tool: &str) -> String {
    format!(
        "{PREFIX}__{}__{}",
        sanitize_component(server),
        sanitize_component(tool)
    )
}
