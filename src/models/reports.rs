use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The fixed set of read-only queries exposed through `POST /query/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Report {
    /// Member count per club. No parameters.
    ClubMemberCounts,
    /// Events of one club. Requires `club`.
    ClubEvents,
    /// Plans whose sex target equals `sex` (or the wildcard).
    PlansBySex,
    /// Foods at or under `max_calories`, lowest first.
    FoodsByCalories,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// Tabular result in the shape `{"columns": [...], "data": [[...], ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub columns: Vec<String>,
    pub data: Vec<Vec<serde_json::Value>>,
}
