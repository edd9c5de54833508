use clubhub::{AppState, ComplianceAnalyzer, build_router, database, load_config};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("clubhub=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    tracing::info!("Loaded configuration:\n{}", config);

    let pool = database::connect(&config.database).await?;
    tracing::info!("Database connected and migrations applied");

    let analyzer = ComplianceAnalyzer::from_config(&config.ai);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::new(pool, config, analyzer));

    let listener = TcpListener::bind(&address).await?;
    tracing::info!(%address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
