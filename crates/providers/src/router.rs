//! Provider selection: turns the `[model]` config section into a live
//! chat gateway.

use crate::openai_compat::OpenAiCompatProvider;
use memoh_config::{ClientType, ModelConfig};
use memoh_core::error::ProviderError;
use memoh_core::provider::Provider;
use std::sync::Arc;
use tracing::debug;

/// Build the provider selected by `config.client_type`.
pub fn build_from_config(config: &ModelConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let base_url = config.resolved_base_url().ok_or_else(|| {
        ProviderError::NotConfigured(format!("{} requires model.base_url", config.client_type))
    })?;

    let api_key = match (&config.api_key, config.client_type.requires_api_key()) {
        (Some(key), _) => key.clone(),
        (None, false) => config.client_type.to_string(),
        (None, true) if config.client_type == ClientType::Custom => String::new(),
        (None, true) => {
            return Err(ProviderError::NotConfigured(format!(
                "{} requires an API key (set model.api_key or MEMOH_API_KEY)",
                config.client_type
            )));
        }
    };

    debug!(client_type = %config.client_type, base_url = %base_url, "Building provider");

    Ok(Arc::new(OpenAiCompatProvider::new(
        config.client_type.to_string(),
        base_url,
        api_key,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openrouter_with_key_builds() {
        let config = ModelConfig {
            client_type: ClientType::OpenRouter,
            api_key: Some("sk-test".into()),
            ..ModelConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openrouter");
    }

    #[test]
    fn openai_without_key_is_not_configured() {
        let config = ModelConfig::default();
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = ModelConfig {
            client_type: ClientType::Ollama,
            ..ModelConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn custom_without_base_url_is_not_configured() {
        let config = ModelConfig {
            client_type: ClientType::Custom,
            ..ModelConfig::default()
        };
        assert!(build_from_config(&config).is_err());
    }

    #[test]
    fn custom_with_base_url_allows_missing_key() {
        let config = ModelConfig {
            client_type: ClientType::Custom,
            base_url: Some("http://localhost:8000/v1".into()),
            ..ModelConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "custom");
    }
}
