use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub club_id: Uuid,
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Partial event update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

/// `?year=&month=` filter for event listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EventPeriod {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl EventPeriod {
    /// Half-open `[start, end)` window, or `None` when no year is given.
    ///
    /// A month without a year is ignored.
    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        use chrono::TimeZone;

        let year = self.year?;
        let (start, end) = match self.month {
            Some(12) => ((year, 12), (year + 1, 1)),
            Some(month) => ((year, month), (year, month + 1)),
            None => ((year, 1), (year + 1, 1)),
        };
        let start = Utc.with_ymd_and_hms(start.0, start.1, 1, 0, 0, 0).single()?;
        let end = Utc.with_ymd_and_hms(end.0, end.1, 1, 0, 0, 0).single()?;
        Some((start, end))
    }
}
