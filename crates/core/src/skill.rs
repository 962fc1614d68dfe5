//! Skills — named bundles of extra instructions activatable mid-session.

use serde::{Deserialize, Serialize};

/// A skill from the session's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Unique name within the catalog
    pub name: String,

    /// One-line summary shown while the skill is inactive
    #[serde(default)]
    pub description: String,

    /// Full instructions appended to the system prompt once enabled
    #[serde(default)]
    pub instructions: String,

    /// Name of the tool that activates this skill, if not the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_trigger: Option<String>,
}

impl Skill {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            instructions: instructions.into(),
            activation_trigger: None,
        }
    }

    pub fn with_activation_trigger(mut self, tool_name: impl Into<String>) -> Self {
        self.activation_trigger = Some(tool_name.into());
        self
    }
}

/// How skills are exposed for activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillActivation {
    /// One tool per catalog skill, named by its `activation_trigger` or
    /// `use-skill-<name>`
    #[default]
    PerSkill,
    /// A single `use-skill` tool taking the skill name as an argument
    ByName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_parses_from_toml_style_json() {
        let skill: Skill = serde_json::from_value(serde_json::json!({
            "name": "cook",
            "instructions": "Answer as a chef."
        }))
        .unwrap();
        assert_eq!(skill.name, "cook");
        assert!(skill.description.is_empty());
        assert!(skill.activation_trigger.is_none());
    }

    #[test]
    fn activation_style_defaults_to_per_skill() {
        assert_eq!(SkillActivation::default(), SkillActivation::PerSkill);
        let parsed: SkillActivation = serde_json::from_str(r#""by_name""#).unwrap();
        assert_eq!(parsed, SkillActivation::ByName);
    }
}
