//! Language model backends
//!
//! The analyzer only needs "send a prompt, get text back". Each provider
//! implements [`CompletionBackend`] on top of its rig client, and
//! [`build_backend`] picks one from the configured `provider:model` string.

pub mod common;
pub mod openai;
pub mod openrouter;

pub use common::{AiProvider, ModelIdentifier};
pub use openai::OpenAiBackend;
pub use openrouter::OpenRouterBackend;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AiConfig;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("language model is not configured")]
    NotConfigured,

    #[error("invalid model identifier: {0}")]
    InvalidModel(String),

    #[error("failed to create model client: {0}")]
    Setup(String),

    #[error("{0}")]
    Request(String),
}

/// Generation parameters shared by every backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u64,
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends one prompt with a system preamble and returns the raw reply text.
    async fn complete(&self, preamble: &str, prompt: &str) -> Result<String, ModelError>;

    /// `provider:model` of the backing model, for logs.
    fn model_name(&self) -> String;
}

/// Builds the backend selected by `config.model`.
pub fn build_backend(config: &AiConfig) -> Result<Arc<dyn CompletionBackend>, ModelError> {
    if !config.is_configured() {
        return Err(ModelError::NotConfigured);
    }

    let identifier =
        ModelIdentifier::parse(&config.model, AiProvider::OpenAi).map_err(ModelError::InvalidModel)?;
    let settings = CompletionSettings {
        model: identifier.model,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let backend: Arc<dyn CompletionBackend> = match identifier.provider {
        AiProvider::OpenAi => Arc::new(OpenAiBackend::new(
            &config.api_key,
            config.base_url.as_deref(),
            settings,
        )?),
        AiProvider::OpenRouter => Arc::new(OpenRouterBackend::new(&config.api_key, settings)?),
    };

    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_backend() {
        let result = build_backend(&AiConfig::default());
        assert!(matches!(result, Err(ModelError::NotConfigured)));
    }

    #[test]
    fn test_selects_provider_from_identifier() {
        let config = AiConfig {
            model: "openrouter:mistralai/mistral-7b-instruct".to_string(),
            api_key: "test-key".to_string().into(),
            ..AiConfig::default()
        };
        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.model_name(), "openrouter:mistralai/mistral-7b-instruct");
    }

    #[test]
    fn test_invalid_identifier() {
        let config = AiConfig {
            model: "acme:model".to_string(),
            api_key: "test-key".to_string().into(),
            ..AiConfig::default()
        };
        assert!(matches!(build_backend(&config), Err(ModelError::InvalidModel(_))));
    }
}
