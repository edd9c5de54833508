use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::events::{CreateEventRequest, Event, EventPeriod, NewEvent, UpdateEventRequest},
    queries::{clubs as club_queries, events},
    services::clubs::{get_club, require_owner_or_member},
    validation::{sanitize_string, validate_required_string, validate_year_month},
};
use uuid::Uuid;

/// Events of the named club within an optional period. Callers must own or belong to it.
pub async fn list_club_events(
    conn: &mut DbConn,
    club_name: &str,
    caller_id: Uuid,
    period: EventPeriod,
) -> Result<Vec<Event>> {
    validate_year_month(period.year, period.month)?;
    let club = get_club(conn, club_name).await?;
    require_owner_or_member(conn, &club, caller_id).await?;
    events::list_events(conn, Some(club.id), period).await
}

/// Every event within an optional period.
pub async fn list_all_events(conn: &mut DbConn, period: EventPeriod) -> Result<Vec<Event>> {
    validate_year_month(period.year, period.month)?;
    events::list_events(conn, None, period).await
}

/// Creates an event for the named club. Callers must own or belong to it.
pub async fn create_event(
    conn: &mut DbConn,
    club_name: &str,
    caller_id: Uuid,
    request: CreateEventRequest,
) -> Result<Event> {
    let name = validate_required_string(&request.name, "name")?;
    let club = get_club(conn, club_name).await?;
    require_owner_or_member(conn, &club, caller_id).await?;

    events::create_event(
        conn,
        NewEvent {
            club_id: club.id,
            name,
            description: request
                .description
                .as_deref()
                .map(sanitize_string)
                .unwrap_or_default(),
            date: request.date,
            image: request.image,
        },
    )
    .await
}

/// Gets an event by ID, failing with NotFound if absent.
pub async fn get_event(conn: &mut DbConn, id: Uuid) -> Result<Event> {
    events::get_event(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Event with ID {} not found", id)))
}

/// Applies a partial update. Callers must own or belong to the event's club.
pub async fn update_event(
    conn: &mut DbConn,
    id: Uuid,
    caller_id: Uuid,
    request: UpdateEventRequest,
) -> Result<Event> {
    let mut event = get_event(conn, id).await?;
    require_event_access(conn, &event, caller_id).await?;

    if let Some(name) = request.name {
        event.name = validate_required_string(&name, "name")?;
    }
    if let Some(description) = request.description {
        event.description = sanitize_string(&description);
    }
    if let Some(date) = request.date {
        event.date = date;
    }
    if request.image.is_some() {
        event.image = request.image;
    }

    events::update_event(conn, &event).await
}

/// Deletes an event. Callers must own or belong to the event's club.
pub async fn delete_event(conn: &mut DbConn, id: Uuid, caller_id: Uuid) -> Result<()> {
    let event = get_event(conn, id).await?;
    require_event_access(conn, &event, caller_id).await?;

    if events::delete_event(conn, id).await? == 0 {
        return Err(Error::NotFound(format!("Event with ID {} not found", id)));
    }
    Ok(())
}

async fn require_event_access(conn: &mut DbConn, event: &Event, caller_id: Uuid) -> Result<()> {
    let club = club_queries::get_club_by_id(conn, event.club_id).await?;
    require_owner_or_member(conn, &club, caller_id).await?;
    Ok(())
}
