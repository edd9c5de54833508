use thiserror::Error;
use std::collections::HashMap;
use serde::{Serialize, Deserialize};

// Import Axum types for HTTP response conversion
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Structured validation errors with field-level error mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    Single { field: String, message: String },
    Multiple { fields: HashMap<String, String> },
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrors::Single { field, message } => write!(f, "{}: {}", field, message),
            ValidationErrors::Multiple { fields } => {
                let mut keys: Vec<&String> = fields.keys().collect();
                keys.sort();
                let joined = keys
                    .into_iter()
                    .map(|k| format!("{}: {}", k, fields[k]))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}", joined)
            }
        }
    }
}

/// The custom error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A validation error with field-level details.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// A not found error (resource does not exist).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A forbidden error (user is neither owner nor member).
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// An authentication error (invalid credentials or token).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Unreadable or incomplete JSON bodies are reported like any other bad field.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::validation("body", rejection.body_text())
    }
}

impl Error {
    /// Shorthand for a single-field validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(ValidationErrors::Single {
            field: field.into(),
            message: message.into(),
        })
    }

    /// Whether this error is caused by the client rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::NotFound(_) | Error::Forbidden(_) | Error::Authentication(_)
        )
    }
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert custom Error to HTTP response
///
/// This implementation maps each error variant to an appropriate HTTP status code
/// and returns a JSON response with an error message and error code.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = match &self {
            Error::Validation(errors) => {
                let message = match errors {
                    ValidationErrors::Single { message, .. } => message.clone(),
                    ValidationErrors::Multiple { .. } => "Validation failed".to_string(),
                };
                match errors {
                    ValidationErrors::Single { field, message: field_message } => {
                        serde_json::json!({
                            "error": message,
                            "code": "VALIDATION_ERROR",
                            "fields": {
                                field: field_message
                            }
                        })
                    }
                    ValidationErrors::Multiple { fields } => {
                        serde_json::json!({
                            "error": message,
                            "code": "VALIDATION_ERROR",
                            "fields": fields
                        })
                    }
                }
            }
            Error::NotFound(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "NOT_FOUND"
                })
            }
            Error::Forbidden(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "FORBIDDEN"
                })
            }
            Error::Authentication(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "AUTHENTICATION_FAILED"
                })
            }
            Error::Sqlx(_) => {
                serde_json::json!({
                    "error": "Database error",
                    "code": "INTERNAL_ERROR"
                })
            }
            Error::Internal(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "INTERNAL_ERROR"
                })
            }
            Error::Config(_) => {
                serde_json::json!({
                    "error": "Configuration error",
                    "code": "CONFIG_ERROR"
                })
            }
        };

        let status = match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let response = Error::validation("password", "Passwords do not match").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::NotFound("Event not found".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Authentication("Invalid credentials".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Forbidden("Not a member".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::validation("email", "Email is required").is_client_error());
        assert!(!Error::Internal("boom".into()).is_client_error());
    }

    #[test]
    fn test_multiple_validation_display_is_sorted() {
        let mut fields = HashMap::new();
        fields.insert("username".to_string(), "taken".to_string());
        fields.insert("email".to_string(), "in use".to_string());
        let errors = ValidationErrors::Multiple { fields };
        assert_eq!(errors.to_string(), "email: in use, username: taken");
    }
}
