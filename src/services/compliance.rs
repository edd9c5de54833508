//! Compliance review of appropriation forms by a language model.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::{
    config::AiConfig,
    models::analysis::FormAnalysis,
    providers::{CompletionBackend, ModelError, build_backend},
    services::documents::{self, DocumentError},
};

/// System preamble sent with every review.
pub const ANALYZER_PREAMBLE: &str =
    "You are a funding request analyzer that responds in JSON format.";

/// The rubric every appropriation form is checked against.
pub const FUNDING_REQUIREMENTS: &str = "\
Please analyze this appropriation form against these requirements:
1. Must specify if funding is one-time or recurring
2. All form fields must be filled out
3. Must show alternative funding sources
4. Must benefit a large number of people
5. No transportation or gas money reimbursements allowed
6. Must have specific date for spending
7. Must include campus advertising plan

For each requirement, indicate if it is met or not met. If not met, explain what needs to be added.
Format your response as a JSON object with 'issues' and 'recommendations' arrays.";

/// First `{` through last `}`, across lines.
static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON block pattern is valid"));

/// Embeds the extracted form text and the rubric into a single prompt.
pub fn build_prompt(form_text: &str) -> String {
    format!(
        "You are an assistant that analyzes funding request forms.\n\
         Please analyze the following appropriation form content:\n\n\
         {form_text}\n\n\
         {FUNDING_REQUIREMENTS}\n\n\
         Remember to format your response as a valid JSON object with 'issues' and 'recommendations' arrays."
    )
}

/// Interprets a raw model reply, falling back to the unparseable-reply payload.
pub fn parse_reply(reply: &str) -> FormAnalysis {
    if let Some(analysis) = parse_analysis(reply) {
        return analysis;
    }

    // Models often wrap the object in prose or code fences
    JSON_BLOCK
        .find(reply)
        .and_then(|block| parse_analysis(block.as_str()))
        .unwrap_or_else(FormAnalysis::unparseable_reply)
}

fn parse_analysis(text: &str) -> Option<FormAnalysis> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    let object = value.as_object()?;
    if !object.contains_key("issues") && !object.contains_key("recommendations") {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Sends forms to the configured model and turns every outcome into a [`FormAnalysis`].
#[derive(Clone)]
pub struct ComplianceAnalyzer {
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl std::fmt::Debug for ComplianceAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceAnalyzer")
            .field("model", &self.backend.as_ref().map(|b| b.model_name()))
            .finish()
    }
}

impl ComplianceAnalyzer {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// An analyzer that reports every request as a model failure.
    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    /// Builds the analyzer once at startup. A missing or broken model
    /// configuration is logged and leaves the analyzer unconfigured.
    pub fn from_config(config: &AiConfig) -> Self {
        match build_backend(config) {
            Ok(backend) => {
                tracing::info!(model = %backend.model_name(), "Compliance analyzer ready");
                Self::new(backend)
            }
            Err(ModelError::NotConfigured) => {
                tracing::warn!("No language model configured; form analysis will report failures");
                Self::unconfigured()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialise language model backend");
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Runs one prompt through the model. Never fails.
    pub async fn infer(&self, prompt: &str) -> FormAnalysis {
        let Some(backend) = &self.backend else {
            return FormAnalysis::model_failure(&ModelError::NotConfigured.to_string());
        };

        match backend.complete(ANALYZER_PREAMBLE, prompt).await {
            Ok(reply) => {
                let analysis = parse_reply(&reply);
                if analysis == FormAnalysis::unparseable_reply() {
                    tracing::warn!(
                        model = %backend.model_name(),
                        reply_len = reply.len(),
                        "Model reply was not valid JSON"
                    );
                }
                analysis
            }
            Err(e) => {
                tracing::error!(model = %backend.model_name(), error = %e, "Model call failed");
                FormAnalysis::model_failure(&e.to_string())
            }
        }
    }

    /// Extracts text from an uploaded form and reviews it.
    pub async fn analyze_document(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<FormAnalysis, DocumentError> {
        let text = documents::extract_text(bytes, content_type)?;
        tracing::debug!(chars = text.len(), "Extracted form text");
        Ok(self.infer(&build_prompt(&text)).await)
    }
}
