use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = sqlx::PgPool;

/// Database connection type - pool connections and transactions both deref to it
pub type DbConn = sqlx::PgConnection;

/// Opens a connection pool and applies the embedded migrations.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.connection_string().expose_secret())
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Builds a pool that only connects on first use.
pub fn connect_lazy(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect_lazy(config.connection_string().expose_secret())
}
