use std::net::SocketAddr;
use std::sync::Arc;

use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_workers_api::config::Config;
use rust_workers_api::db::Database;
use rust_workers_api::db_storage::PgWorkerStore;
use rust_workers_api::handlers::AppState;
use rust_workers_api::router::build_router;
use rust_workers_api::services::WorkerService;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Database connection and schema.
/// - HTTP routes and middleware (CORS, body limit, rate limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_workers_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing store connection string is fatal
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database connection pool established");
    db.migrate().await?;

    let store = PgWorkerStore::new(db.pool.clone());
    let app_state = Arc::new(AppState {
        workers: WorkerService::new(Arc::new(store), config.max_page_limit),
        config: config.clone(),
    });

    // Configure rate limiter per client IP
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| {
                anyhow::anyhow!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be non-zero")
            })?,
    );

    let app = build_router(app_state).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
