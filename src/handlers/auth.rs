use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;

use crate::{
    error::Result,
    handlers::{JsonBody, acquire_db_connection, log_handler_error},
    models::users::{LoginUser, RefreshRequest, RegisterUser},
    services::users,
    state::AppState,
};

/// POST /api/register/
///
/// Registers a new user and logs them in.
///
/// # Request Body
/// - `username`: Unique username
/// - `email`: Unique email address
/// - `password`, `password2`: Password and its confirmation (must match)
/// - `club_name` (or `clubName`): Optional club to join, created if it does not exist
///
/// # Returns
/// `{"message", "user", "token": {"access", "refresh"}}`
///
/// # HTTP Status Codes
/// - `201 CREATED`: User registered successfully
/// - `400 BAD_REQUEST`: Passwords differ, invalid fields, or username/email taken
/// - `500 INTERNAL_SERVER_ERROR`: Database error
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterUser>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    tracing::info!(
        operation = "register",
        username = %request.username,
        with_club = request.club_name.is_some(),
        "Registering user",
    );

    // Rejected before a connection is taken
    if request.password != request.password2 {
        let err = crate::error::Error::validation("password2", "Passwords do not match");
        log_handler_error("register", &err);
        return Err(err);
    }

    let mut conn = acquire_db_connection(&state, "register").await?;
    let result = users::register_user(&mut conn, request, &state.config.jwt)
        .await
        .inspect_err(|e| log_handler_error("register", e))?;

    tracing::info!(operation = "register", user_id = %result.user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered and logged in successfully",
            "user": result.user,
            "token": result.token,
        })),
    ))
}

/// POST /api/login/
///
/// Authenticates with username and password.
///
/// # HTTP Status Codes
/// - `200 OK`: `{"message", "user", "token": {"access", "refresh"}}`
/// - `401 UNAUTHORIZED`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginUser>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!(operation = "login", username = %request.username, "Login attempt");

    let mut conn = acquire_db_connection(&state, "login").await?;
    let result = users::login_user(&mut conn, request, &state.config.jwt)
        .await
        .inspect_err(|e| log_handler_error("login", e))?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": result.user,
        "token": result.token,
    })))
}

/// POST /api/token/refresh/
///
/// Exchanges a refresh token for a new access token.
///
/// # HTTP Status Codes
/// - `200 OK`: `{"access": "<jwt>"}`
/// - `401 UNAUTHORIZED`: Invalid, expired, or not a refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> Result<Json<serde_json::Value>> {
    let access = users::refresh_access_token(&request.refresh, &state.config.jwt)
        .inspect_err(|e| log_handler_error("refresh_token", e))?;

    Ok(Json(json!({ "access": access })))
}
