use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_api::config::Config;
use blog_api::db::{Database, SqliteUserStore};
use blog_api::security::jwt::JwtManager;
use blog_api::services::AuthService;
use blog_api::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; fails fast on a missing signing secret
    let config = Config::load()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize database
    let db = Database::connect(&config).await?;
    db.run_migrations().await?;

    // Wire the auth core: one immutable token manager, one service
    let tokens = Arc::new(JwtManager::new(&config.jwt));
    let store = Arc::new(SqliteUserStore::new(db.pool.clone()));
    let auth = AuthService::new(store, tokens.clone());

    let state = AppState { auth, tokens };
    let app = api::router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received, stopping server");
}
