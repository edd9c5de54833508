use async_trait::async_trait;
use axum::Router;
use clubhub::{
    AppState, ComplianceAnalyzer, Config, build_router, database,
    providers::{CompletionBackend, ModelError},
};
use reqwest::{Client, redirect::Policy};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Backend that answers every prompt with a fixed reply and records the prompts.
pub struct StubBackend {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubBackend {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(reason.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, _preamble: &str, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(ModelError::Request)
    }

    fn model_name(&self) -> String {
        "stub:canned".to_string()
    }
}

/// HTTP test application wrapper
///
/// Runs the full router on a random port. The database pool is lazy, so
/// requests that never reach the database work without Postgres.
pub struct TestApp {
    /// Server base URL (e.g., "http://127.0.0.1:54321")
    pub address: String,
    pub client: Client,
    pub config: Config,
    pub state: AppState,
}

impl TestApp {
    /// Full router with a stub model backend replying `{"issues":[],"recommendations":[]}`.
    pub async fn new() -> Self {
        Self::with_analyzer(ComplianceAnalyzer::new(StubBackend::replying(
            r#"{"issues": [], "recommendations": []}"#,
        )))
        .await
    }

    pub async fn with_analyzer(analyzer: ComplianceAnalyzer) -> Self {
        let state = test_state(analyzer);
        Self::serve(build_router(state.clone()), state).await
    }

    /// Serves a caller-built router, for handlers that need a hand-made request context.
    pub async fn with_router(router: Router, state: AppState) -> Self {
        Self::serve(router, state).await
    }

    async fn serve(router: Router, state: AppState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{port}");

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address,
            client,
            config: state.config.as_ref().clone(),
            state,
        }
    }

    /// Get the full URL for an API endpoint
    ///
    /// # Example
    /// ```rust
    /// let url = app.url("/api/health");
    /// // Returns: "http://127.0.0.1:54321/api/health"
    /// ```
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// App state over a lazy pool built from the loaded config.
pub fn test_state(analyzer: ComplianceAnalyzer) -> AppState {
    let config = Config::load().expect("Failed to load config");
    let pool = database::connect_lazy(&config.database).expect("Failed to build lazy pool");
    AppState::new(pool, config, analyzer)
}
