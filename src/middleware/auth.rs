//! JWT authentication middleware
//!
//! Validates the bearer access token on protected routes and makes the
//! caller available to handlers as [`AuthenticatedUser`].

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::users::User,
    queries,
    services::jwt::authenticate_jwt_token,
    state::AppState,
};

/// Authenticated user extracted from JWT token
///
/// This struct is added to request extensions by the JWT middleware.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// JWT authentication middleware
///
/// # Behavior
/// 1. Reads `Authorization: Bearer <token>`
/// 2. Validates signature, expiration and that it is an access token
/// 3. Loads the user; tokens of unknown users are rejected
/// 4. Adds `AuthenticatedUser` to request extensions
/// 5. Returns 401 if the token is missing, invalid or the user is gone
///
/// # Usage
/// ```ignore
/// Router::new()
///     .route("/protected", get(protected_handler))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         jwt_auth_middleware,
///     ))
/// ```
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
    let user_id = authenticate_jwt_token(auth_header, state.config.jwt.secret.expose_secret())?;

    let mut conn = state.pool.acquire().await?;
    let user = queries::users::get_user_by_id(&mut conn, user_id)
        .await?
        .ok_or_else(|| Error::Authentication("User not found".to_string()))?;
    drop(conn);

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(user));
    Ok(next.run(request).await)
}
