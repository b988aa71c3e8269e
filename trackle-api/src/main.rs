//! # Trackle API Server
//!
//! This is the main API server for Trackle, a multi-tenant task and
//! project tracker.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - User registration (multipart with avatar upload), login, and logout
//! - JWT bearer authentication with a per-user token generation counter
//! - Project CRUD with a per-user project cap
//! - Task CRUD with the todo / in-progress / completed lifecycle
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p trackle-api
//! ```

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackle_api::app::{build_router, AppState};
use trackle_api::avatar;
use trackle_api::config::Config;
use trackle_shared::db::{close_pool, create_pool, run_migrations, DatabaseConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "trackle_api=debug,trackle_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Trackle API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let avatars = avatar::from_config(&config.avatar);
    let state = AppState::new(pool.clone(), config, avatars);
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    close_pool(pool).await;

    Ok(())
}

/// Resolve when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
