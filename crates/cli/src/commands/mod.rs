pub mod agent;
pub mod config_cmd;
pub mod daemon;

use crate::console::ConsoleSender;
use memoh_agent::AgentSessionBuilder;
use memoh_config::AppConfig;
use memoh_memory::FileMemoryStore;
use std::sync::Arc;

/// Load the config file, failing with a readable message.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}

/// A session builder wired to the configured model, the memory file, and
/// console delivery for outbound messages.
pub fn session_builder(config: &AppConfig) -> Result<AgentSessionBuilder, Box<dyn std::error::Error>> {
    if config.model.client_type.requires_api_key() && !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set MEMOH_API_KEY (or OPENAI_API_KEY), or add model.api_key to:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = memoh_providers::router::build_from_config(&config.model)?;
    let memory = Arc::new(FileMemoryStore::new(config.memory_path()));

    Ok(AgentSessionBuilder::from_config(provider, config)
        .with_memory(memory)
        .with_messaging(Arc::new(ConsoleSender::stdout())))
}
