//! Club and membership handlers
//!
//! Clubs are addressed by their unique name in the path. Membership changes
//! are reserved to the owner; reading members and events needs ownership or
//! membership.

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    error::Result,
    handlers::{JsonBody, acquire_db_connection, log_handler_error},
    middleware::auth::AuthenticatedUser,
    models::clubs::{Club, CreateClubRequest, MemberEmailRequest},
    services::clubs,
    state::AppState,
};

/// POST /api/clubs/
///
/// # HTTP Status Codes
/// - `201 CREATED`: Club created, caller is owner and first member
/// - `400 BAD_REQUEST`: Invalid or duplicate name
pub async fn create_club(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    JsonBody(request): JsonBody<CreateClubRequest>,
) -> Result<(StatusCode, Json<Club>)> {
    tracing::info!(
        operation = "create_club",
        owner_id = %auth_user.id,
        name = %request.name,
        "Creating club",
    );

    let mut conn = acquire_db_connection(&state, "create_club").await?;
    let club = clubs::create_club(&mut conn, auth_user.id, request)
        .await
        .inspect_err(|e| log_handler_error("create_club", e))?;

    tracing::info!(operation = "create_club", club_id = %club.id, "Club created");

    Ok((StatusCode::CREATED, Json(club)))
}

/// GET /api/clubs/
///
/// Clubs the caller belongs to.
pub async fn list_clubs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Club>>> {
    let mut conn = acquire_db_connection(&state, "list_clubs").await?;
    let clubs = clubs::list_user_clubs(&mut conn, auth_user.id)
        .await
        .inspect_err(|e| log_handler_error("list_clubs", e))?;

    Ok(Json(clubs))
}

/// GET /api/clubs/{name}/
pub async fn get_club(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(club_name): Path<String>,
) -> Result<Json<Club>> {
    let mut conn = acquire_db_connection(&state, "get_club").await?;
    let club = clubs::get_club(&mut conn, &club_name)
        .await
        .inspect_err(|e| log_handler_error("get_club", e))?;

    Ok(Json(club))
}

/// GET /api/clubs/{name}/members/
///
/// # HTTP Status Codes
/// - `200 OK`: Members of the club
/// - `403 FORBIDDEN`: Caller neither owns nor belongs to the club
/// - `404 NOT_FOUND`: Club missing, or `{"message": "No members found"}` when empty
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(club_name): Path<String>,
) -> Result<Response> {
    tracing::info!(
        operation = "list_members",
        club = %club_name,
        requester_id = %auth_user.id,
        "Listing club members",
    );

    let mut conn = acquire_db_connection(&state, "list_members").await?;
    let members = clubs::list_members(&mut conn, &club_name, auth_user.id)
        .await
        .inspect_err(|e| log_handler_error("list_members", e))?;

    if members.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No members found" })),
        )
            .into_response());
    }

    Ok(Json(members).into_response())
}

/// POST /api/clubs/{name}/add-member/
///
/// Owner only. Body: `{"email": "..."}`.
///
/// # HTTP Status Codes
/// - `200 OK`: `{"message": "User <email> added to <club>"}`
/// - `400 BAD_REQUEST`: Email missing or user already a member
/// - `403 FORBIDDEN`: Caller is not the owner
/// - `404 NOT_FOUND`: Club or user missing
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(club_name): Path<String>,
    JsonBody(request): JsonBody<MemberEmailRequest>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!(
        operation = "add_member",
        club = %club_name,
        requester_id = %auth_user.id,
        "Adding club member",
    );

    let mut conn = acquire_db_connection(&state, "add_member").await?;
    let user = clubs::add_member(&mut conn, &club_name, auth_user.id, request)
        .await
        .inspect_err(|e| log_handler_error("add_member", e))?;

    Ok(Json(json!({
        "message": format!("User {} added to {}", user.email, club_name),
    })))
}

/// DELETE /api/clubs/{name}/members/
///
/// Owner only. Body: `{"email": "..."}`. The owner cannot be removed.
///
/// # HTTP Status Codes
/// - `200 OK`: `{"message": "User <email> removed from <club>"}`
/// - `400 BAD_REQUEST`: Email missing, user not a member, or user is the owner
/// - `403 FORBIDDEN`: Caller is not the owner
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(club_name): Path<String>,
    JsonBody(request): JsonBody<MemberEmailRequest>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!(
        operation = "remove_member",
        club = %club_name,
        requester_id = %auth_user.id,
        "Removing club member",
    );

    let mut conn = acquire_db_connection(&state, "remove_member").await?;
    let user = clubs::remove_member(&mut conn, &club_name, auth_user.id, request)
        .await
        .inspect_err(|e| log_handler_error("remove_member", e))?;

    Ok(Json(json!({
        "message": format!("User {} removed from {}", user.email, club_name),
    })))
}
