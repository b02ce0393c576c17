//! # MovieHub API Server
//!
//! Serves the movie board: accounts, the catalog, votes, comments and the
//! admin dashboard.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/moviehub \
//! JWT_SECRET=change-me-to-at-least-32-characters \
//! cargo run -p moviehub-api
//! ```

use moviehub_api::{
    app::{build_router, AppState},
    config::Config,
    telemetry,
};
use moviehub_shared::db::{migrations, pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("moviehub_api=debug,moviehub_shared=debug,tower_http=debug");

    tracing::info!("MovieHub API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::info!(environment = ?config.environment, "Configuration loaded");

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, draining connections...");
    pool::close_pool(db).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
