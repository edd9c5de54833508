use crate::{config::Config, database::DbPool, services::compliance::ComplianceAnalyzer};
use std::sync::Arc;

/// Application state shared across all HTTP handlers
///
/// Everything here is built once at startup and cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for accessing the database
    pub pool: DbPool,
    /// Immutable configuration, including the JWT secret
    pub config: Arc<Config>,
    /// Language model client used by form analysis
    pub analyzer: Arc<ComplianceAnalyzer>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config, analyzer: ComplianceAnalyzer) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
        }
    }
}
