//! HTTP handlers
//!
//! Handlers follow the thin-layer pattern: they extract inputs, delegate to
//! services, log the outcome and shape the response.

pub mod analysis;
pub mod auth;
pub mod clubs;
pub mod events;
pub mod health;
pub mod nutrition;
pub mod reports;
pub mod users;

use axum::extract::FromRequest;

use crate::{
    error::{Error, Result},
    state::AppState,
};

/// `axum::Json` whose rejections become `400 VALIDATION_ERROR` responses.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Helper to acquire database connection
pub(crate) async fn acquire_db_connection(
    state: &AppState,
    operation: &'static str,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
    state.pool.acquire().await.map_err(|e| {
        tracing::error!(
            operation = operation,
            error_code = "DATABASE_ACQUISITION_FAILED",
            error = %e,
            "Failed to acquire database connection",
        );
        Error::Internal(format!("Failed to acquire database connection: {}", e))
    })
}

/// Helper to log handler errors
pub(crate) fn log_handler_error(operation: &str, e: &Error) {
    if e.is_client_error() {
        tracing::warn!(operation = operation, error = %e, "Handler operation failed");
    } else {
        tracing::error!(operation = operation, error = %e, "Handler operation failed");
    }
}
