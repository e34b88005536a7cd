//! # Courseware LMS API Server
//!
//! REST backend for courses, their module/chapter/section tree, learner
//! progress and the course board.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/lms JWT_SECRET=change-me cargo run -p lms-api
//! ```

use lms_api::{
    app::{build_router, AppState},
    config::Config,
};
use lms_shared::{
    db::{
        migrations::{latest_version, run_migrations},
        pool::{close_pool, create_pool},
    },
    store::PgStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lms_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("LMS API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(config.pool_config()).await?;
    run_migrations(&pool).await?;
    match latest_version(&pool).await? {
        Some(version) => tracing::info!(version, "Database schema up to date"),
        None => tracing::warn!("No migrations recorded"),
    }

    let address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(pool.clone())), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
