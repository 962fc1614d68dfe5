//! Skill activation: the session's enabled-skill set and the tools that
//! grow it.
//!
//! The set only grows. Enabling is idempotent and mutations are serialized
//! behind a lock, so tool calls dispatched concurrently within one step
//! cannot lose an activation.

use async_trait::async_trait;
use chrono::Utc;
use memoh_core::error::ToolError;
use memoh_core::event::{DomainEvent, EventBus};
use memoh_core::skill::Skill;
use memoh_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Tracks which catalog skills are enabled for one session.
#[derive(Clone)]
pub struct SkillTracker {
    catalog: Arc<Vec<Skill>>,
    enabled: Arc<RwLock<Vec<Skill>>>,
    events: Option<Arc<EventBus>>,
}

impl SkillTracker {
    /// Create a tracker over `catalog` with `initially_enabled` turned on.
    ///
    /// Names not found in the catalog are ignored with a warning.
    pub fn new(catalog: Vec<Skill>, initially_enabled: &[String]) -> Self {
        let mut enabled: Vec<Skill> = Vec::new();
        for name in initially_enabled {
            match catalog.iter().find(|s| &s.name == name) {
                Some(skill) if !enabled.iter().any(|s| s.name == skill.name) => {
                    enabled.push(skill.clone())
                }
                Some(_) => {}
                None => warn!(skill = %name, "Default skill not in catalog, ignoring"),
            }
        }

        Self {
            catalog: Arc::new(catalog),
            enabled: Arc::new(RwLock::new(enabled)),
            events: None,
        }
    }

    /// Publish `SkillEnabled` events on `bus`.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn catalog(&self) -> &[Skill] {
        &self.catalog
    }

    /// Enable `skill`. Returns `true` if it was not already enabled.
    pub async fn enable(&self, skill: &Skill) -> bool {
        let mut enabled = self.enabled.write().await;
        if enabled.iter().any(|s| s.name == skill.name) {
            return false;
        }
        enabled.push(skill.clone());
        drop(enabled);

        info!(skill = %skill.name, "Skill enabled");
        if let Some(bus) = &self.events {
            bus.publish(DomainEvent::SkillEnabled {
                skill: skill.name.clone(),
                timestamp: Utc::now(),
            });
        }
        true
    }

    /// Enable the catalog skill called `name`.
    pub async fn enable_by_name(&self, name: &str) -> Result<bool, ToolError> {
        let skill = self
            .catalog
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ToolError::InvalidArguments(format!("Unknown skill '{name}'")))?;
        Ok(self.enable(skill).await)
    }

    /// Enabled skills in activation order.
    pub async fn enabled(&self) -> Vec<Skill> {
        self.enabled.read().await.clone()
    }

    /// Names of enabled skills in activation order.
    pub async fn enabled_names(&self) -> Vec<String> {
        self.enabled
            .read()
            .await
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }
}

/// Default activation tool name for a skill.
pub fn activation_tool_name(skill: &Skill) -> String {
    skill
        .activation_trigger
        .clone()
        .unwrap_or_else(|| format!("use-skill-{}", skill.name))
}

fn activation_result(name: &str, newly_enabled: bool) -> ToolResult {
    let output = if newly_enabled {
        format!("Skill '{name}' enabled. Its instructions apply from your next step.")
    } else {
        format!("Skill '{name}' is already enabled.")
    };
    let mut result = ToolResult::text(output);
    result.data = Some(serde_json::json!({ "skill": name, "newly_enabled": newly_enabled }));
    result
}

/// Activates one specific skill.
pub struct UseSkillTool {
    skill: Skill,
    name: String,
    description: String,
    tracker: SkillTracker,
}

impl UseSkillTool {
    pub fn new(skill: Skill, tracker: SkillTracker) -> Self {
        let name = activation_tool_name(&skill);
        let description = if skill.description.is_empty() {
            format!("Enable the '{}' skill.", skill.name)
        } else {
            format!("Enable the '{}' skill: {}", skill.name, skill.description)
        };
        Self {
            skill,
            name,
            description,
            tracker,
        }
    }
}

#[async_trait]
impl Tool for UseSkillTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let newly_enabled = self.tracker.enable(&self.skill).await;
        Ok(activation_result(&self.skill.name, newly_enabled))
    }
}

/// Activates any catalog skill by name.
pub struct UseSkillByNameTool {
    tracker: SkillTracker,
}

impl UseSkillByNameTool {
    pub fn new(tracker: SkillTracker) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Tool for UseSkillByNameTool {
    fn name(&self) -> &str {
        "use-skill"
    }

    fn description(&self) -> &str {
        "Enable a skill by name. Enabled skills add their instructions to your system prompt."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let names: Vec<&str> = self.tracker.catalog().iter().map(|s| s.name.as_str()).collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "enum": names,
                    "description": "The skill to enable"
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let name = arguments["name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'name' argument".into()))?;
        let newly_enabled = self.tracker.enable_by_name(name).await?;
        Ok(activation_result(name, newly_enabled))
    }
}
