//! The capability registry: composes the tool set offered to the model.
//!
//! [`CapabilityRegistry::build_tools`] is a pure function of the configured
//! sources and the external tools discovered for the turn. The loop calls
//! it before every step so the tool set and the skill prompt always agree.

use crate::memory_search::MemorySearchTool;
use crate::message::SendMessageTool;
use crate::schedule::schedule_tools;
use crate::skill::{SkillTracker, UseSkillByNameTool, UseSkillTool};
use crate::web_search::WebSearchSettings;
use memoh_core::memory::MemoryStore;
use memoh_core::messaging::{MessageSender, Platform};
use memoh_core::schedule::ScheduleStore;
use memoh_core::skill::SkillActivation;
use memoh_core::tool::{Tool, ToolRegistry};
use std::sync::Arc;

#[derive(Clone)]
struct MemorySource {
    store: Arc<dyn MemoryStore>,
    owner_id: String,
    locale: String,
}

#[derive(Clone)]
struct MessagingSource {
    sender: Arc<dyn MessageSender>,
    platforms: Vec<Platform>,
}

/// The sources one session draws its tools from.
#[derive(Clone)]
pub struct CapabilityRegistry {
    skills: SkillTracker,
    activation: SkillActivation,
    schedules: Arc<dyn ScheduleStore>,
    memory: Option<MemorySource>,
    messaging: Option<MessagingSource>,
    web_search: WebSearchSettings,
}

impl CapabilityRegistry {
    pub fn new(skills: SkillTracker, schedules: Arc<dyn ScheduleStore>) -> Self {
        Self {
            skills,
            activation: SkillActivation::default(),
            schedules,
            memory: None,
            messaging: None,
            web_search: WebSearchSettings::default(),
        }
    }

    pub fn with_activation(mut self, activation: SkillActivation) -> Self {
        self.activation = activation;
        self
    }

    /// Offer `search-memory` over `store`.
    pub fn with_memory(
        mut self,
        store: Arc<dyn MemoryStore>,
        owner_id: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        self.memory = Some(MemorySource {
            store,
            owner_id: owner_id.into(),
            locale: locale.into(),
        });
        self
    }

    /// Offer `send-message` to `platforms`.
    pub fn with_messaging(mut self, sender: Arc<dyn MessageSender>, platforms: Vec<Platform>) -> Self {
        self.messaging = Some(MessagingSource { sender, platforms });
        self
    }

    /// Offer `web-search` when `settings` carries a key.
    pub fn with_web_search(mut self, settings: WebSearchSettings) -> Self {
        self.web_search = settings;
        self
    }

    pub fn skills(&self) -> &SkillTracker {
        &self.skills
    }

    /// Build the tool set for one step.
    ///
    /// Built-ins first, then `external` (already namespaced by server).
    pub fn build_tools(&self, external: &ToolRegistry) -> ToolRegistry {
        let mut registry = ToolRegistry::new();

        registry.extend(schedule_tools(self.schedules.clone()));

        match self.activation {
            SkillActivation::PerSkill => {
                registry.extend(self.skills.catalog().iter().map(|skill| {
                    Arc::new(UseSkillTool::new(skill.clone(), self.skills.clone())) as Arc<dyn Tool>
                }));
            }
            SkillActivation::ByName if !self.skills.catalog().is_empty() => {
                registry.register(Arc::new(UseSkillByNameTool::new(self.skills.clone())));
            }
            SkillActivation::ByName => {}
        }

        if let Some(memory) = &self.memory {
            registry.register(Arc::new(
                MemorySearchTool::new(memory.store.clone(), memory.owner_id.clone())
                    .with_locale(memory.locale.clone()),
            ));
        }

        if let Some(messaging) = &self.messaging {
            registry.register(Arc::new(SendMessageTool::new(
                messaging.sender.clone(),
                messaging.platforms.clone(),
            )));
        }

        if let Some(search) = self.web_search.tool() {
            registry.register(Arc::new(search));
        }

        registry.extend(external.tools().cloned());

        registry
    }
}
