use crate::{
    error::{Error, Result},
    models::reports::ReportResult,
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::DbConn;

/// Member count per club, largest first.
pub async fn club_member_counts(conn: &mut DbConn) -> Result<ReportResult> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT c.name, COUNT(m.user_id) AS member_count
        FROM clubs c
        LEFT JOIN club_members m ON m.club_id = c.id
        GROUP BY c.id, c.name
        ORDER BY member_count DESC, c.name ASC
        "#,
    )
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(table(
        ["club", "member_count"],
        rows.into_iter().map(|(name, count)| vec![json!(name), json!(count)]),
    ))
}

/// Events of the named club, oldest first.
pub async fn club_events(conn: &mut DbConn, club_name: &str) -> Result<ReportResult> {
    let rows: Vec<(Uuid, String, DateTime<Utc>, String)> = sqlx::query_as(
        r#"
        SELECT e.id, e.name, e.date, e.description
        FROM events e
        JOIN clubs c ON c.id = e.club_id
        WHERE c.name = $1
        ORDER BY e.date ASC
        "#,
    )
    .bind(club_name)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(table(
        ["id", "name", "date", "description"],
        rows.into_iter().map(|(id, name, date, description)| {
            vec![json!(id), json!(name), json!(date), json!(description)]
        }),
    ))
}

/// Plans targeting the given sex, including plans that accept any sex.
pub async fn plans_by_sex(conn: &mut DbConn, sex: &str) -> Result<ReportResult> {
    let rows: Vec<(Uuid, String, String)> = sqlx::query_as(
        r#"
        SELECT id, name, sex
        FROM nutrition_plans
        WHERE lower(trim(sex)) = lower(trim($1)) OR sex = 'A'
        ORDER BY name ASC
        "#,
    )
    .bind(sex)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(table(
        ["id", "name", "sex"],
        rows.into_iter()
            .map(|(id, name, sex)| vec![json!(id), json!(name), json!(sex)]),
    ))
}

/// Foods at or under `max_calories`, lowest first.
pub async fn foods_by_calories(conn: &mut DbConn, max_calories: f64) -> Result<ReportResult> {
    let rows: Vec<(String, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT food_name, calories
        FROM nutrition_facts
        WHERE calories <= $1
        ORDER BY calories ASC, food_name ASC
        "#,
    )
    .bind(max_calories)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(table(
        ["food_name", "calories"],
        rows.into_iter()
            .map(|(food, calories)| vec![json!(food), json!(calories)]),
    ))
}

fn table<const N: usize>(
    columns: [&str; N],
    rows: impl Iterator<Item = Vec<Value>>,
) -> ReportResult {
    ReportResult {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        data: rows.collect(),
    }
}
