//! # Memoh Core
//!
//! Domain types, collaborator traits, and error definitions for the Memoh
//! conversational agent. This crate has no framework dependencies: it
//! defines the model every other crate implements against.
//!
//! ## Collaborators
//!
//! The agent core talks to the outside world only through traits defined
//! here:
//! - [`Provider`] — the reasoning capability (an LLM behind a chat gateway)
//! - [`MemoryStore`] — time-bounded reads and searches over stored turns
//! - [`ScheduleStore`] — create / list / remove recurring triggers
//! - [`MessageSender`] — outbound messages to a named platform
//! - [`Tool`] — anything the model may call

pub mod error;
pub mod event;
pub mod external;
pub mod locale;
pub mod memory;
pub mod message;
pub mod messaging;
pub mod provider;
pub mod schedule;
pub mod skill;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use external::ExternalServerSpec;
pub use memory::{MemoryStore, MemoryUnit};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use messaging::{MessageSender, Platform, SendMessageOptions};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, ToolDefinition};
pub use schedule::{NewSchedule, Schedule, ScheduleStore};
pub use skill::{Skill, SkillActivation};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
