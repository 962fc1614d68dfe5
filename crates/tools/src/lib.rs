//! Tools and the capability registry for Memoh.
//!
//! Tools give the agent the ability to act: manage schedules, enable
//! skills, search memory, message the user on another platform, and search
//! the web. [`CapabilityRegistry`] decides which of them a step offers.

pub mod capabilities;
pub mod memory_search;
pub mod message;
pub mod schedule;
pub mod skill;
pub mod web_search;

#[cfg(test)]
mod test_support;

pub use capabilities::CapabilityRegistry;
pub use memory_search::MemorySearchTool;
pub use message::SendMessageTool;
pub use schedule::{CreateScheduleTool, ListSchedulesTool, RemoveScheduleTool, schedule_tools};
pub use skill::{SkillTracker, UseSkillByNameTool, UseSkillTool, activation_tool_name};
pub use web_search::{BraveSearchTool, WebSearchSettings};
