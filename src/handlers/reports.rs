use axum::{
    Json,
    extract::{Extension, State},
};

use crate::{
    handlers::JsonBody,
    middleware::auth::AuthenticatedUser,
    models::reports::{ReportRequest, ReportResult},
    services::reports::{self, ReportError},
    state::AppState,
};

/// POST /api/query/
///
/// Runs one of the allow-listed report queries.
///
/// # Request Body
/// `{"query": "<report name>", "params": {...}}`
///
/// | report | params |
/// |---|---|
/// | `club_member_counts` | none |
/// | `club_events` | `club` |
/// | `plans_by_sex` | `sex` |
/// | `foods_by_calories` | `max_calories` |
///
/// # HTTP Status Codes
/// - `200 OK`: `{"columns": [...], "data": [[...], ...]}`
/// - `400 BAD_REQUEST`: `QUERY_MISSING`, `UNKNOWN_QUERY`, `INVALID_PARAMETER` or `SQL_ERROR`
/// - `503 SERVICE_UNAVAILABLE`: `DATABASE_UNAVAILABLE`
/// - `500 INTERNAL_SERVER_ERROR`: `QUERY_FAILED`
pub async fn run_query(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    JsonBody(request): JsonBody<ReportRequest>,
) -> Result<Json<ReportResult>, ReportError> {
    tracing::info!(
        operation = "run_query",
        requester_id = %auth_user.id,
        query = request.query.as_deref().unwrap_or("<missing>"),
        "Running report query",
    );

    let result = reports::run_report(&state.pool, request)
        .await
        .inspect_err(|e| {
            if e.status().is_server_error() {
                tracing::error!(operation = "run_query", code = e.code(), error = %e, "Report failed");
            } else {
                tracing::warn!(operation = "run_query", code = e.code(), error = %e, "Report rejected");
            }
        })?;

    tracing::debug!(operation = "run_query", rows = result.data.len(), "Report completed");

    Ok(Json(result))
}
