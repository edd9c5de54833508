use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::{JsonBody, acquire_db_connection, log_handler_error},
    middleware::auth::AuthenticatedUser,
    models::users::{UpdateProfile, User, UserNutrition, UserSearchQuery},
    services::users,
    state::AppState,
};

/// GET /api/user/
///
/// Returns the authenticated user's profile.
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<User>> {
    let mut conn = acquire_db_connection(&state, "get_current_user").await?;
    let user = users::get_user(&mut conn, auth_user.id)
        .await
        .inspect_err(|e| log_handler_error("get_current_user", e))?;

    Ok(Json(user))
}

/// PUT /api/user/
///
/// Partially updates the authenticated user's profile. Absent fields are kept.
///
/// # HTTP Status Codes
/// - `200 OK`: Updated profile
/// - `400 BAD_REQUEST`: Out-of-range age or unknown nutrition plan
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    JsonBody(request): JsonBody<UpdateProfile>,
) -> Result<Json<User>> {
    tracing::info!(
        operation = "update_current_user",
        user_id = %auth_user.id,
        "Updating profile",
    );

    let mut conn = acquire_db_connection(&state, "update_current_user").await?;
    let user = users::update_profile(&mut conn, auth_user.id, request)
        .await
        .inspect_err(|e| log_handler_error("update_current_user", e))?;

    Ok(Json(user))
}

/// GET /api/users/{id}/nutrition/
///
/// Nutrient targets of a user together with their assigned plan.
pub async fn get_user_nutrition(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserNutrition>> {
    let mut conn = acquire_db_connection(&state, "get_user_nutrition").await?;
    let nutrition = users::get_user_nutrition(&mut conn, user_id)
        .await
        .inspect_err(|e| log_handler_error("get_user_nutrition", e))?;

    Ok(Json(nutrition))
}

/// GET /api/search-users/?query=
///
/// Case-insensitive substring search over usernames and emails.
///
/// # HTTP Status Codes
/// - `200 OK`: Matching users (possibly empty)
/// - `400 BAD_REQUEST`: Empty query
pub async fn search_users(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(params): Query<UserSearchQuery>,
) -> Result<Json<Vec<User>>> {
    tracing::debug!(
        operation = "search_users",
        requester_id = %auth_user.id,
        query = %params.query,
        "Searching users",
    );

    if params.query.trim().is_empty() {
        let err = crate::error::Error::validation("query", "Query parameter is required");
        log_handler_error("search_users", &err);
        return Err(err);
    }

    let mut conn = acquire_db_connection(&state, "search_users").await?;
    let found = users::search_users(&mut conn, &params.query)
        .await
        .inspect_err(|e| log_handler_error("search_users", e))?;

    Ok(Json(found))
}
