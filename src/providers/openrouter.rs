//! OpenRouter completion backend

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openrouter::Client;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::{CompletionBackend, CompletionSettings, ModelError};

/// OpenRouter gives access to many hosted models through one API key.
pub struct OpenRouterBackend {
    client: Client,
    settings: CompletionSettings,
}

impl fmt::Debug for OpenRouterBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterBackend")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl OpenRouterBackend {
    pub fn new(api_key: &SecretString, settings: CompletionSettings) -> Result<Self, ModelError> {
        let client = Client::new(api_key.expose_secret())
            .map_err(|e| ModelError::Setup(e.to_string()))?;

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterBackend {
    async fn complete(&self, preamble: &str, prompt: &str) -> Result<String, ModelError> {
        let agent = self
            .client
            .agent(&self.settings.model)
            .preamble(preamble)
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| ModelError::Request(e.to_string()))
    }

    fn model_name(&self) -> String {
        format!("openrouter:{}", self.settings.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openrouter_backend_creation() {
        let api_key = SecretString::from("test-key");
        let backend = OpenRouterBackend::new(
            &api_key,
            CompletionSettings {
                model: "meta-llama/llama-3-8b-instruct".to_string(),
                temperature: 0.2,
                max_tokens: 500,
            },
        )
        .unwrap();
        assert_eq!(backend.model_name(), "openrouter:meta-llama/llama-3-8b-instruct");
    }
}
