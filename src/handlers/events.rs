use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::{JsonBody, acquire_db_connection, log_handler_error},
    middleware::auth::AuthenticatedUser,
    models::events::{CreateEventRequest, Event, EventPeriod, UpdateEventRequest},
    services::events,
    state::AppState,
};

/// GET /api/clubs/{name}/events/?year=&month=
///
/// Events of a club, oldest first. `month` only applies together with `year`.
pub async fn list_club_events(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(club_name): Path<String>,
    Query(period): Query<EventPeriod>,
) -> Result<Json<Vec<Event>>> {
    let mut conn = acquire_db_connection(&state, "list_club_events").await?;
    let events = events::list_club_events(&mut conn, &club_name, auth_user.id, period)
        .await
        .inspect_err(|e| log_handler_error("list_club_events", e))?;

    tracing::debug!(
        operation = "list_club_events",
        club = %club_name,
        count = events.len(),
        "Club events listed",
    );

    Ok(Json(events))
}

/// POST /api/clubs/{name}/events/
///
/// # HTTP Status Codes
/// - `201 CREATED`: Event created
/// - `403 FORBIDDEN`: Caller neither owns nor belongs to the club
pub async fn create_club_event(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(club_name): Path<String>,
    JsonBody(request): JsonBody<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    tracing::info!(
        operation = "create_event",
        club = %club_name,
        requester_id = %auth_user.id,
        "Creating event",
    );

    let mut conn = acquire_db_connection(&state, "create_event").await?;
    let event = events::create_event(&mut conn, &club_name, auth_user.id, request)
        .await
        .inspect_err(|e| log_handler_error("create_event", e))?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/events/?year=&month=
pub async fn list_events(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(period): Query<EventPeriod>,
) -> Result<Json<Vec<Event>>> {
    let mut conn = acquire_db_connection(&state, "list_events").await?;
    let events = events::list_all_events(&mut conn, period)
        .await
        .inspect_err(|e| log_handler_error("list_events", e))?;

    Ok(Json(events))
}

/// GET /api/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>> {
    let mut conn = acquire_db_connection(&state, "get_event").await?;
    let event = events::get_event(&mut conn, event_id)
        .await
        .inspect_err(|e| log_handler_error("get_event", e))?;

    Ok(Json(event))
}

/// PUT /api/events/{id}
///
/// Partial update by an owner or member of the event's club.
pub async fn update_event(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(event_id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateEventRequest>,
) -> Result<Json<Event>> {
    tracing::info!(
        operation = "update_event",
        event_id = %event_id,
        requester_id = %auth_user.id,
        "Updating event",
    );

    let mut conn = acquire_db_connection(&state, "update_event").await?;
    let event = events::update_event(&mut conn, event_id, auth_user.id, request)
        .await
        .inspect_err(|e| log_handler_error("update_event", e))?;

    Ok(Json(event))
}

/// DELETE /api/events/{id}
///
/// # HTTP Status Codes
/// - `204 NO_CONTENT`: Event deleted
/// - `403 FORBIDDEN`: Caller neither owns nor belongs to the event's club
/// - `404 NOT_FOUND`: Event missing
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode> {
    tracing::info!(
        operation = "delete_event",
        event_id = %event_id,
        requester_id = %auth_user.id,
        "Deleting event",
    );

    let mut conn = acquire_db_connection(&state, "delete_event").await?;
    events::delete_event(&mut conn, event_id, auth_user.id)
        .await
        .inspect_err(|e| log_handler_error("delete_event", e))?;

    Ok(StatusCode::NO_CONTENT)
}
