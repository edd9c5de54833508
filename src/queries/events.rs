use crate::{
    error::{Error, Result},
    models::events::{Event, EventPeriod, NewEvent},
};
use uuid::Uuid;

use crate::DbConn;

pub async fn create_event(conn: &mut DbConn, new_event: NewEvent) -> Result<Event> {
    let event = sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (id, club_id, name, description, date, image)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, club_id, name, description, date, image, created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(new_event.club_id)
    .bind(&new_event.name)
    .bind(&new_event.description)
    .bind(new_event.date)
    .bind(&new_event.image)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(event)
}

/// Gets a single event by ID. The event may not exist.
pub async fn get_event(conn: &mut DbConn, id: Uuid) -> Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, club_id, name, description, date, image, created_at, updated_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(event)
}

/// Lists events, oldest first, optionally scoped to one club and a period.
///
/// A `None` bound on either side of the window means "unbounded".
pub async fn list_events(
    conn: &mut DbConn,
    club_id: Option<Uuid>,
    period: EventPeriod,
) -> Result<Vec<Event>> {
    let window = period.window();
    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, club_id, name, description, date, image, created_at, updated_at
        FROM events
        WHERE ($1::uuid IS NULL OR club_id = $1)
          AND ($2::timestamptz IS NULL OR date >= $2)
          AND ($3::timestamptz IS NULL OR date < $3)
        ORDER BY date ASC
        "#,
    )
    .bind(club_id)
    .bind(window.map(|(start, _)| start))
    .bind(window.map(|(_, end)| end))
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(events)
}

/// Writes the mutable columns of `event` back. Expects the event to exist.
pub async fn update_event(conn: &mut DbConn, event: &Event) -> Result<Event> {
    let updated = sqlx::query_as::<_, Event>(
        r#"
        UPDATE events
        SET name = $1, description = $2, date = $3, image = $4, updated_at = now()
        WHERE id = $5
        RETURNING id, club_id, name, description, date, image, created_at, updated_at
        "#,
    )
    .bind(&event.name)
    .bind(&event.description)
    .bind(event.date)
    .bind(&event.image)
    .bind(event.id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?
    .ok_or_else(|| Error::NotFound(format!("Event with ID {} not found", event.id)))?;

    Ok(updated)
}

/// Deletes an event. Returns the number of affected rows.
pub async fn delete_event(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(result.rows_affected())
}
