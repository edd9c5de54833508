//! Provider selection from `provider:model` identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};

/// Supported language model providers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AiProvider {
    OpenAi,
    OpenRouter,
}

/// Parsed model identifier with provider and model name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentifier {
    pub provider: AiProvider,
    pub model: String,
}

impl ModelIdentifier {
    /// Parses `provider:model`, or a bare model name served by `default_provider`.
    pub fn parse(input: &str, default_provider: AiProvider) -> Result<Self, String> {
        let input = input.trim();
        let (provider, model) = match input.split_once(':') {
            Some((provider, model)) => (
                AiProvider::from_str(provider)
                    .map_err(|_| format!("Unknown provider: {}", provider))?,
                model,
            ),
            None => (default_provider, input),
        };

        if model.trim().is_empty() {
            return Err(format!("Missing model name in '{}'", input));
        }

        Ok(ModelIdentifier {
            provider,
            model: model.trim().to_string(),
        })
    }
}

impl FromStr for ModelIdentifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelIdentifier::parse(s, AiProvider::OpenAi)
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}
