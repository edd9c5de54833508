//! OpenAI (and OpenAI-compatible) completion backend

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai::Client;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::{CompletionBackend, CompletionSettings, ModelError};

pub struct OpenAiBackend {
    client: Client,
    settings: CompletionSettings,
}

impl fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("settings", &self.settings)
            .field("client", &"<OpenAI Client>")
            .finish()
    }
}

impl OpenAiBackend {
    /// Creates a backend against api.openai.com, or against `base_url` when given.
    pub fn new(
        api_key: &SecretString,
        base_url: Option<&str>,
        settings: CompletionSettings,
    ) -> Result<Self, ModelError> {
        // Local OpenAI-compatible servers usually ignore the key but rig requires one
        let key = match api_key.expose_secret().trim() {
            "" => "not-needed",
            key => key,
        };

        let client = if let Some(url) = base_url {
            tracing::info!(base_url = %url, "Creating OpenAI backend with custom base URL");
            Client::builder()
                .api_key(key)
                .base_url(url)
                .build()
                .map_err(|e| ModelError::Setup(e.to_string()))?
        } else {
            tracing::info!("Creating OpenAI backend with default base URL");
            Client::new(key).map_err(|e| ModelError::Setup(e.to_string()))?
        };

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
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
        format!("openai:{}", self.settings.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CompletionSettings {
        CompletionSettings {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    #[test]
    fn test_openai_backend_creation() {
        let api_key = SecretString::from("test-key");
        let backend = OpenAiBackend::new(&api_key, None, settings()).unwrap();
        assert_eq!(backend.model_name(), "openai:gpt-4o-mini");
    }

    #[test]
    fn test_local_endpoint_without_key() {
        let api_key = SecretString::from("");
        let backend = OpenAiBackend::new(&api_key, Some("http://localhost:11434/v1"), settings());
        assert!(backend.is_ok());
    }
}
