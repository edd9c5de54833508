use serde::{Deserialize, Serialize};

/// Compliance review of an appropriation form.
///
/// Items are kept as raw JSON because models return either plain strings or
/// small objects (`{"requirement": ..., "status": ...}`). A reply that omits
/// one of the arrays yields an empty list for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormAnalysis {
    #[serde(default)]
    pub issues: Vec<serde_json::Value>,
    #[serde(default)]
    pub recommendations: Vec<serde_json::Value>,
}

impl FormAnalysis {
    pub fn new<I, R>(issues: I, recommendations: R) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            issues: issues.into_iter().map(|s| serde_json::Value::String(s.into())).collect(),
            recommendations: recommendations
                .into_iter()
                .map(|s| serde_json::Value::String(s.into()))
                .collect(),
        }
    }

    /// Returned when the model reply is not valid JSON.
    pub fn unparseable_reply() -> Self {
        Self::new(
            ["Error parsing model response"],
            ["The model response was not in valid JSON format"],
        )
    }

    /// Returned when the model could not be reached.
    pub fn model_failure(reason: &str) -> Self {
        Self::new(
            [format!("Error calling language model: {}", reason)],
            ["Please try again later".to_string()],
        )
    }

    /// Returned when the uploaded document could not be read.
    pub fn processing_failure(reason: &str) -> Self {
        Self::new(
            [format!("Error processing form: {}", reason)],
            ["Please check the file format and try again".to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_shape() {
        let json = serde_json::to_value(FormAnalysis::unparseable_reply()).unwrap();
        assert_eq!(json["issues"][0], "Error parsing model response");
        assert!(json["recommendations"].is_array());
    }

    #[test]
    fn test_model_failure_includes_reason() {
        let analysis = FormAnalysis::model_failure("timeout");
        assert_eq!(analysis.issues[0], "Error calling language model: timeout");
    }
}
