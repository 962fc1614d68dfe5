//! Configuration loading, validation, and management for Memoh.
//!
//! Loads configuration from `~/.memoh/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use memoh_core::{ExternalServerSpec, NewSchedule, Platform, Skill, SkillActivation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.memoh/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat gateway and model selection
    #[serde(default)]
    pub model: ModelConfig,

    /// Session behavior: prompts, skills, step bound, context window
    #[serde(default)]
    pub agent: AgentConfig,

    /// Web search tool
    #[serde(default)]
    pub web_search: WebSearchConfig,

    /// External tool servers opened per turn
    #[serde(default)]
    pub mcp: McpConfig,

    /// Conversation memory
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Schedules seeded into the store when the daemon starts
    #[serde(default)]
    pub schedules: Vec<NewSchedule>,
}

/// Which kind of chat gateway the model is served by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    #[default]
    OpenAi,
    OpenRouter,
    Ollama,
    /// Any other OpenAI-compatible endpoint; `base_url` is required
    Custom,
}

impl ClientType {
    /// The gateway's default base URL, if it has one.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Self::Ollama => Some("http://localhost:11434/v1"),
            Self::Custom => None,
        }
    }

    /// Whether requests need an API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub client_type: ClientType,

    /// Overrides the client type's default base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

impl ModelConfig {
    /// The base URL requests go to.
    pub fn resolved_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| self.client_type.default_base_url().map(String::from))
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            client_type: ClientType::default(),
            base_url: None,
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("client_type", &self.client_type)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Upper bound on reasoning steps per turn
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Context window in minutes
    #[serde(default = "default_max_context_load_time")]
    pub max_context_load_time: i64,

    /// Response language directive
    #[serde(default = "default_language")]
    pub language: String,

    /// Locale tag used when rendering dates and times
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Platforms the agent can send messages to
    #[serde(default)]
    pub platforms: Vec<Platform>,

    /// The platform the current conversation happens on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_platform: Option<String>,

    /// The skill catalog
    #[serde(default)]
    pub skills: Vec<Skill>,

    /// Names of skills enabled at session start
    #[serde(default)]
    pub use_skills: Vec<String>,

    #[serde(default)]
    pub skill_activation: SkillActivation,

    /// Memory owner for turn persistence and memory search
    #[serde(default = "default_owner_id")]
    pub owner_id: String,

    /// Store each completed turn back into memory
    #[serde(default = "default_true")]
    pub persist_turns: bool,
}

fn default_max_steps() -> usize {
    50
}
fn default_max_context_load_time() -> i64 {
    24 * 60
}
fn default_language() -> String {
    "Same as user input".into()
}
fn default_locale() -> String {
    "en-US".into()
}
fn default_owner_id() -> String {
    "default".into()
}
fn default_true() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            max_context_load_time: default_max_context_load_time(),
            language: default_language(),
            locale: default_locale(),
            platforms: vec![],
            current_platform: None,
            skills: vec![],
            use_skills: vec![],
            skill_activation: SkillActivation::default(),
            owner_id: default_owner_id(),
            persist_turns: true,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    /// Brave Search API key; the web-search tool is offered only when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brave_api_key: Option<String>,

    #[serde(default = "default_brave_base_url")]
    pub brave_base_url: String,

    #[serde(default = "default_search_results")]
    pub max_results: usize,
}

fn default_brave_base_url() -> String {
    "https://api.search.brave.com/res/v1".into()
}
fn default_search_results() -> usize {
    5
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            brave_api_key: None,
            brave_base_url: default_brave_base_url(),
            max_results: default_search_results(),
        }
    }
}

impl std::fmt::Debug for WebSearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchConfig")
            .field("brave_api_key", &redact(&self.brave_api_key))
            .field("brave_base_url", &self.brave_base_url)
            .field("max_results", &self.max_results)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default)]
    pub servers: Vec<ExternalServerSpec>,

    /// Per-request timeout for tool-server calls
    #[serde(default = "default_mcp_timeout")]
    pub timeout_secs: u64,
}

fn default_mcp_timeout() -> u64 {
    30
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            servers: vec![],
            timeout_secs: default_mcp_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// JSONL file backing the memory store; in-memory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the default path (`~/.memoh/config.toml`).
    ///
    /// Also checks environment variables:
    /// - `MEMOH_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `MEMOH_MODEL`
    /// - `BRAVE_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if self.model.api_key.is_none() {
            self.model.api_key = std::env::var("MEMOH_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("MEMOH_MODEL") {
            self.model.model = model;
        }

        if self.web_search.brave_api_key.is_none() {
            self.web_search.brave_api_key = std::env::var("BRAVE_API_KEY").ok();
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".memoh")
    }

    /// The memory file path, defaulting under the config directory.
    pub fn memory_path(&self) -> PathBuf {
        self.memory
            .path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("memory.jsonl"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.model.client_type == ClientType::Custom && self.model.base_url.is_none() {
            return Err(ConfigError::ValidationError(
                "model.base_url is required when client_type = \"custom\"".into(),
            ));
        }

        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }

        if self.agent.max_context_load_time < 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_context_load_time must not be negative".into(),
            ));
        }

        let mut skill_names = HashSet::new();
        for skill in &self.agent.skills {
            if !skill_names.insert(skill.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate skill '{}' in agent.skills",
                    skill.name
                )));
            }
        }

        for name in &self.agent.use_skills {
            if !skill_names.contains(name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "agent.use_skills names unknown skill '{name}'"
                )));
            }
        }

        let mut server_names = HashSet::new();
        for name in self.mcp.servers.iter().filter_map(ExternalServerSpec::name) {
            if !server_names.insert(name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate external server '{name}' in mcp.servers"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.model.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.max_steps, 50);
        assert_eq!(config.agent.max_context_load_time, 1440);
        assert_eq!(config.agent.language, "Same as user input");
        assert_eq!(config.agent.skill_activation, SkillActivation::PerSkill);
        assert!(config.agent.persist_turns);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model.model, config.model.model);
        assert_eq!(parsed.agent.locale, config.agent.locale);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.model.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_step_bound_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn custom_client_requires_base_url() {
        let mut config = AppConfig::default();
        config.model.client_type = ClientType::Custom;
        assert!(config.validate().is_err());

        config.model.base_url = Some("http://localhost:8000/v1".into());
        assert!(config.validate().is_ok());
        assert_eq!(
            config.model.resolved_base_url().as_deref(),
            Some("http://localhost:8000/v1")
        );
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.model.client_type, ClientType::OpenAi);
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o-mini"));
        assert!(toml_str.contains("Same as user input"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.model.api_key = Some("sk-very-secret".into());
        config.web_search.brave_api_key = Some("brave-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(!debug.contains("brave-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn agent_section_parsing() {
        let toml_str = r#"
[agent]
max_steps = 10
current_platform = "telegram"
use_skills = ["cook"]
skill_activation = "by_name"

[[agent.platforms]]
name = "telegram"

[[agent.platforms]]
name = "discord"
description = "Team server"

[[agent.skills]]
name = "cook"
description = "Recipes and cooking help"
instructions = "Answer as a professional chef."
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.max_steps, 10);
        assert_eq!(config.agent.platforms.len(), 2);
        assert_eq!(config.agent.skills[0].name, "cook");
        assert_eq!(config.agent.skill_activation, SkillActivation::ByName);
        assert_eq!(config.agent.max_context_load_time, 1440);
    }

    #[test]
    fn use_skills_must_exist_in_catalog() {
        let toml_str = r#"
[agent]
use_skills = ["missing"]
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn mcp_servers_parse_with_unknown_transport() {
        let toml_str = r#"
[mcp]
timeout_secs = 5

[[mcp.servers]]
type = "stdio"
name = "files"
command = "mcp-files"
args = ["--root", "/data"]

[[mcp.servers]]
type = "websocket"
name = "ws"
url = "ws://localhost:9000"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mcp.timeout_secs, 5);
        assert_eq!(config.mcp.servers.len(), 2);
        assert_eq!(config.mcp.servers[0].transport(), "stdio");
        assert_eq!(config.mcp.servers[1], ExternalServerSpec::Unsupported);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn duplicate_server_names_rejected() {
        let toml_str = r#"
[[mcp.servers]]
type = "http"
name = "search"
url = "http://localhost:8080/mcp"

[[mcp.servers]]
type = "sse"
name = "search"
url = "http://localhost:8081/sse"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn schedule_seeds_parse() {
        let toml_str = r#"
[[schedules]]
name = "standup"
pattern = "0 9 * * 1-5"
max_calls = 20
command = "Remind me about standup"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.schedules.len(), 1);
        assert_eq!(config.schedules[0].max_calls, Some(20));
    }

    #[test]
    fn load_from_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\ntemperature = 9.0\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
