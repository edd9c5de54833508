//! Allow-listed, parameterized read-only report queries.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use crate::{
    DbPool,
    error::Error,
    models::reports::{Report, ReportRequest, ReportResult},
    queries::reports,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No query provided")]
    QueryMissing,

    #[error("Unknown query '{0}'")]
    UnknownQuery(String),

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("SQL error: {0}")]
    Sql(String),

    #[error("Query failed: {0}")]
    Failed(String),
}

impl ReportError {
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::QueryMissing => "QUERY_MISSING",
            ReportError::UnknownQuery(_) => "UNKNOWN_QUERY",
            ReportError::InvalidParameter { .. } => "INVALID_PARAMETER",
            ReportError::DatabaseUnavailable(_) => "DATABASE_UNAVAILABLE",
            ReportError::Sql(_) => "SQL_ERROR",
            ReportError::Failed(_) => "QUERY_FAILED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ReportError::QueryMissing
            | ReportError::UnknownQuery(_)
            | ReportError::InvalidParameter { .. }
            | ReportError::Sql(_) => StatusCode::BAD_REQUEST,
            ReportError::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReportError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ReportError {
    fn from(error: Error) -> Self {
        match error {
            Error::Sqlx(sqlx::Error::Database(e)) => ReportError::Sql(e.message().to_string()),
            Error::Sqlx(
                e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)),
            ) => ReportError::DatabaseUnavailable(e.to_string()),
            other => ReportError::Failed(other.to_string()),
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Resolves a request to a known report. Does not touch the database.
pub fn resolve(request: &ReportRequest) -> Result<Report, ReportError> {
    let name = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(ReportError::QueryMissing)?;

    Report::from_str(name).map_err(|_| ReportError::UnknownQuery(name.to_string()))
}

/// A report together with its checked parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundReport {
    ClubMemberCounts,
    ClubEvents { club: String },
    PlansBySex { sex: String },
    FoodsByCalories { max_calories: f64 },
}

/// Checks the parameters `report` needs. Does not touch the database.
pub fn bind_params(
    report: Report,
    params: &HashMap<String, Value>,
) -> Result<BoundReport, ReportError> {
    Ok(match report {
        Report::ClubMemberCounts => BoundReport::ClubMemberCounts,
        Report::ClubEvents => BoundReport::ClubEvents {
            club: text_param(params, "club")?,
        },
        Report::PlansBySex => BoundReport::PlansBySex {
            sex: text_param(params, "sex")?,
        },
        Report::FoodsByCalories => BoundReport::FoodsByCalories {
            max_calories: number_param(params, "max_calories")?,
        },
    })
}

/// Runs the requested report.
pub async fn run_report(pool: &DbPool, request: ReportRequest) -> Result<ReportResult, ReportError> {
    let report = resolve(&request)?;
    // Parameters are checked before a connection is taken
    let bound = bind_params(report, &request.params)?;

    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| ReportError::DatabaseUnavailable(e.to_string()))?;

    let result = match bound {
        BoundReport::ClubMemberCounts => reports::club_member_counts(&mut conn).await,
        BoundReport::ClubEvents { club } => reports::club_events(&mut conn, &club).await,
        BoundReport::PlansBySex { sex } => reports::plans_by_sex(&mut conn, &sex).await,
        BoundReport::FoodsByCalories { max_calories } => {
            reports::foods_by_calories(&mut conn, max_calories).await
        }
    };

    Ok(result?)
}

fn text_param(params: &HashMap<String, Value>, name: &str) -> Result<String, ReportError> {
    match params.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ReportError::InvalidParameter {
            name: name.to_string(),
            message: "a non-empty string is required".to_string(),
        }),
    }
}

fn number_param(params: &HashMap<String, Value>, name: &str) -> Result<f64, ReportError> {
    let value = match params.get(name) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| ReportError::InvalidParameter {
            name: name.to_string(),
            message: "a number is required".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> ReportRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_resolve_missing_query() {
        let err = resolve(&request(json!({}))).unwrap_err();
        assert_eq!(err.code(), "QUERY_MISSING");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = resolve(&request(json!({ "query": "   " }))).unwrap_err();
        assert_eq!(err.code(), "QUERY_MISSING");
    }

    #[test]
    fn test_resolve_rejects_raw_sql() {
        let err = resolve(&request(json!({ "query": "SELECT * FROM users" }))).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_QUERY");
    }

    #[test]
    fn test_resolve_known_report() {
        let report = resolve(&request(json!({ "query": "club_member_counts" }))).unwrap();
        assert_eq!(report, Report::ClubMemberCounts);
    }

    #[test]
    fn test_number_param_accepts_strings_and_numbers() {
        let params: HashMap<String, Value> =
            [("a".to_string(), json!(250)), ("b".to_string(), json!("99.5"))].into();
        assert_eq!(number_param(&params, "a").unwrap(), 250.0);
        assert_eq!(number_param(&params, "b").unwrap(), 99.5);
        assert!(number_param(&params, "c").is_err());
    }

    #[test]
    fn test_bind_params_per_report() {
        let params: HashMap<String, Value> = [
            ("club".to_string(), json!("  Chess ")),
            ("max_calories".to_string(), json!("500")),
        ]
        .into();

        assert_eq!(
            bind_params(Report::ClubEvents, &params).unwrap(),
            BoundReport::ClubEvents { club: "Chess".to_string() }
        );
        assert_eq!(
            bind_params(Report::FoodsByCalories, &params).unwrap(),
            BoundReport::FoodsByCalories { max_calories: 500.0 }
        );
        assert_eq!(
            bind_params(Report::ClubMemberCounts, &HashMap::new()).unwrap(),
            BoundReport::ClubMemberCounts
        );

        let err = bind_params(Report::PlansBySex, &params).unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");
        assert!(err.to_string().contains("sex"));
    }

    #[test]
    fn test_error_kinds_map_to_status() {
        assert_eq!(
            ReportError::DatabaseUnavailable("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ReportError::Sql("syntax".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ReportError::Failed("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
