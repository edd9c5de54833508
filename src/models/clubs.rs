use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewClub {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClubRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of the add/remove member endpoints.
///
/// `email` is optional so a missing value surfaces as a validation error
/// rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// How the caller relates to a club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClubRole {
    Owner,
    Member,
}
