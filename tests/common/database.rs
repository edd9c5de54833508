use clubhub::{DbPool, load_config};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::sync::Once;

static INIT: Once = Once::new();

/// Connects to the configured database and applies migrations.
pub async fn init_test_db() -> PgPool {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
    });

    let config = load_config().expect("Failed to load config");
    let pool = PgPool::connect(config.database.connection_string().expose_secret())
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Test database wrapper with a per-test namespace
///
/// Every username, email and club name a test creates should start with
/// [`TestDb::prefix`]. Rows under the prefix are removed when the wrapper is
/// created (test retries) and again when it is dropped. Clubs, memberships and
/// events go with their owners through `ON DELETE CASCADE`.
///
/// # Important Rules:
/// - **ALWAYS use the test function name as `test_name`**
/// - Tests run in parallel; the prefix keeps them apart
pub struct TestDb {
    pub pool: DbPool,
    test_prefix: String,
}

impl TestDb {
    pub async fn new(test_name: &str) -> Self {
        let pool = init_test_db().await;
        let test_prefix = format!("t_{}", test_name);

        Self::cleanup_prefix(&pool, &test_prefix).await;

        Self { pool, test_prefix }
    }

    pub async fn get_connection(&self) -> sqlx::pool::PoolConnection<sqlx::Postgres> {
        self.pool
            .acquire()
            .await
            .expect("Failed to get database connection")
    }

    pub fn prefix(&self) -> &str {
        &self.test_prefix
    }

    /// `<prefix>_<suffix>`, for usernames and club names.
    pub fn name(&self, suffix: &str) -> String {
        format!("{}_{}", self.test_prefix, suffix)
    }

    /// `<prefix>_<suffix>@example.com`
    pub fn email(&self, suffix: &str) -> String {
        format!("{}_{}@example.com", self.test_prefix, suffix)
    }

    async fn cleanup_prefix(pool: &PgPool, prefix: &str) {
        let pattern = format!("{}%", prefix);
        sqlx::query("DELETE FROM clubs WHERE name LIKE $1")
            .bind(&pattern)
            .execute(pool)
            .await
            .expect("Failed to cleanup test clubs");
        sqlx::query("DELETE FROM users WHERE username LIKE $1")
            .bind(&pattern)
            .execute(pool)
            .await
            .expect("Failed to cleanup test users");
        sqlx::query("DELETE FROM nutrition_plans WHERE name LIKE $1")
            .bind(&pattern)
            .execute(pool)
            .await
            .expect("Failed to cleanup test plans");
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let pool = self.pool.clone();
        let prefix = self.test_prefix.clone();
        tokio::spawn(async move {
            TestDb::cleanup_prefix(&pool, &prefix).await;
        });
    }
}
