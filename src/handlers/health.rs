//! Health check handler

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

/// Public health check response
///
/// Simple status indicator for load balancers. `model_configured` tells
/// operators whether form analysis can reach a language model.
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Status indicator (always "ok")
    pub status: String,
    pub model_configured: bool,
}

/// GET /api/health
///
/// # Example
/// ```bash
/// curl http://localhost:8000/api/health
/// # Returns: {"status":"ok","model_configured":false}
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    tracing::debug!(operation = "health_check", "Health check requested");
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        model_configured: state.analyzer.is_configured(),
    })
}
