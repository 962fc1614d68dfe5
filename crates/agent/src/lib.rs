//! The Memoh agent — a session wrapped around a tool-calling model.
//!
//! Each turn follows the same cycle:
//!
//! 1. **Load context** from memory (top-level asks only)
//! 2. **Append** the user turn
//! 3. **Send to LLM** with a freshly rendered system prompt and tool set
//! 4. **If tool calls**: execute them, append results, loop back to step 3
//! 5. **If text**: the turn is complete
//!
//! The loop also ends after `max_steps` rounds; that is a truncation, not
//! a failure. Turns run buffered ([`AgentSession::ask`]), streamed
//! ([`AgentSession::ask_stream`]), or from a fired schedule
//! ([`AgentSession::trigger_schedule`]).

pub mod context;
pub mod driver;
pub mod prompt;
pub mod session;
pub mod stream;
pub mod stream_event;
pub mod trigger;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::ContextLoader;
pub use driver::ModelSettings;
pub use prompt::{PromptContext, resolve_current_platform};
pub use session::{AgentResult, AgentSession, AgentSessionBuilder, AgentSettings};
pub use stream::AgentStream;
pub use stream_event::AgentStreamEvent;
pub use trigger::schedule_prompt;
