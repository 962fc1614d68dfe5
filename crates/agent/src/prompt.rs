//! System prompt generation.
//!
//! The prompt is rendered fresh before every step: the enabled-skill set
//! can grow while a turn runs, and a skill's instructions must reach the
//! model on the step right after it was enabled.

use chrono::{DateTime, Utc};
use memoh_core::locale::{format_date, format_time};
use memoh_core::{Platform, Skill, SkillActivation};
use memoh_tools::activation_tool_name;
use std::fmt::Write;

/// Platform name used when no platforms are configured.
pub const CLIENT_PLATFORM: &str = "client";

/// Platform name used when the configured current platform is not listed.
pub const UNKNOWN_PLATFORM: &str = "Unknown Platform";

/// Resolve the platform the session is talking on.
pub fn resolve_current_platform(platforms: &[Platform], configured: Option<&str>) -> String {
    if platforms.is_empty() {
        return CLIENT_PLATFORM.to_string();
    }
    configured
        .and_then(|name| platforms.iter().find(|p| p.name == name))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| UNKNOWN_PLATFORM.to_string())
}

/// Everything the system prompt depends on except the clock and the
/// enabled-skill set.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub locale: String,
    pub language: String,
    /// Context window in minutes
    pub max_context_load_time: i64,
    pub platforms: Vec<Platform>,
    pub current_platform: String,
    pub catalog: Vec<Skill>,
    pub activation: SkillActivation,
}

impl PromptContext {
    /// Render the system prompt for `now` with `enabled` skills active.
    pub fn render(&self, now: &DateTime<Utc>, enabled: &[Skill]) -> String {
        let mut prompt = String::from(
            "You are Memoh, a personal assistant that remembers past conversations, \
             keeps schedules, and reaches the user on their platforms.\n",
        );

        let _ = write!(
            prompt,
            "\n---\ndate: {}\ntime: {}\ntimezone: UTC\nlocale: {}\nlanguage: {}\nplatform: {}\ncontext-window: {} minutes\n---\n",
            format_date(now, &self.locale),
            format_time(now, &self.locale),
            self.locale,
            self.language,
            self.current_platform,
            self.max_context_load_time,
        );

        let _ = write!(
            prompt,
            "\nReply in this language: {}.\n\n\
             ## Memory\n\
             Messages from the last {} minutes are already in this conversation. \
             Use `search-memory` to look further back.\n\n\
             ## Schedules\n\
             Use `create-schedule` with a 5-field cron pattern for anything recurring, \
             `list-schedules` to review them, and `remove-schedule` to cancel one. \
             When a schedule fires you will receive its instruction as a message.\n",
            self.language, self.max_context_load_time,
        );

        if !self.platforms.is_empty() {
            prompt.push_str("\n## Platforms\nUse `send-message` to reach the user on:\n");
            for platform in &self.platforms {
                match &platform.description {
                    Some(desc) => {
                        let _ = writeln!(prompt, "- {}: {desc}", platform.name);
                    }
                    None => {
                        let _ = writeln!(prompt, "- {}", platform.name);
                    }
                }
            }
        }

        let inactive: Vec<&Skill> = self
            .catalog
            .iter()
            .filter(|s| !enabled.iter().any(|e| e.name == s.name))
            .collect();
        if !inactive.is_empty() {
            prompt.push_str("\n## Available skills\nEnable a skill when the conversation needs it:\n");
            for skill in inactive {
                let tool = match self.activation {
                    SkillActivation::PerSkill => format!("`{}`", activation_tool_name(skill)),
                    SkillActivation::ByName => format!("`use-skill` with name \"{}\"", skill.name),
                };
                if skill.description.is_empty() {
                    let _ = writeln!(prompt, "- {} (enable with {tool})", skill.name);
                } else {
                    let _ = writeln!(
                        prompt,
                        "- {}: {} (enable with {tool})",
                        skill.name, skill.description
                    );
                }
            }
        }

        if !enabled.is_empty() {
            prompt.push_str("\n## Active skills\n");
            for skill in enabled {
                let _ = write!(prompt, "\n### {}\n{}\n", skill.name, skill.instructions.trim_end());
            }
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(12, 5, 9)
            .unwrap()
            .and_utc()
    }

    fn context(platforms: Vec<Platform>, catalog: Vec<Skill>) -> PromptContext {
        PromptContext {
            locale: "en-US".into(),
            language: "Same as user input".into(),
            max_context_load_time: 1440,
            current_platform: resolve_current_platform(&platforms, Some("telegram")),
            platforms,
            catalog,
            activation: SkillActivation::PerSkill,
        }
    }

    fn cook() -> Skill {
        Skill::new("cook", "Kitchen help", "Answer as a chef. Always give quantities.")
    }

    #[test]
    fn platform_resolution() {
        let platforms = vec![Platform::new("telegram"), Platform::new("discord")];
        assert_eq!(resolve_current_platform(&[], Some("telegram")), "client");
        assert_eq!(resolve_current_platform(&platforms, Some("discord")), "discord");
        assert_eq!(resolve_current_platform(&platforms, Some("slack")), "Unknown Platform");
        assert_eq!(resolve_current_platform(&platforms, None), "Unknown Platform");
    }

    #[test]
    fn renders_header_fields() {
        let prompt = context(vec![], vec![]).render(&noon(), &[]);
        assert!(prompt.contains("date: 3/14/2026"));
        assert!(prompt.contains("time: 12:05:09 PM"));
        assert!(prompt.contains("platform: client"));
        assert!(prompt.contains("context-window: 1440 minutes"));
        assert!(!prompt.contains("## Platforms"));
    }

    #[test]
    fn lists_platforms_with_descriptions() {
        let mut telegram = Platform::new("telegram");
        telegram.description = Some("Mobile chat".into());
        let prompt = context(vec![telegram], vec![]).render(&noon(), &[]);
        assert!(prompt.contains("platform: telegram"));
        assert!(prompt.contains("- telegram: Mobile chat"));
    }

    #[test]
    fn inactive_skill_shows_description_only() {
        let prompt = context(vec![], vec![cook()]).render(&noon(), &[]);
        assert!(prompt.contains("- cook: Kitchen help (enable with `use-skill-cook`)"));
        assert!(!prompt.contains("Answer as a chef"));
    }

    #[test]
    fn enabled_skill_contributes_instructions() {
        let prompt = context(vec![], vec![cook()]).render(&noon(), &[cook()]);
        assert!(prompt.contains("### cook\nAnswer as a chef. Always give quantities."));
        assert!(!prompt.contains("## Available skills"));
    }

    #[test]
    fn by_name_activation_mentions_shared_tool() {
        let mut ctx = context(vec![], vec![cook()]);
        ctx.activation = SkillActivation::ByName;
        let prompt = ctx.render(&noon(), &[]);
        assert!(prompt.contains("`use-skill` with name \"cook\""));
    }

    #[test]
    fn rendering_is_deterministic() {
        let ctx = context(vec![Platform::new("telegram")], vec![cook()]);
        assert_eq!(ctx.render(&noon(), &[]), ctx.render(&noon(), &[]));
    }
}
