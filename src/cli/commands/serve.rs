use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};
use crate::state::AppState;
use crate::storage::LocalObjectStore;

/// Starts the HTTP server and runs until ctrl-c.
pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    info!("Starting Portfolio API in {:?} mode", config.environment);

    let (store, manager): (Arc<dyn Store>, Option<DatabaseManager>) = match &config.database.url {
        Some(url) => {
            // A configured database that cannot be reached is fatal.
            let manager = DatabaseManager::connect(&config.database, url)
                .await
                .context("failed to connect to the database")?;
            (Arc::new(PgStore::from_manager(&manager)), Some(manager))
        }
        None => {
            warn!("DATABASE_URL not set; records are kept in memory and lost on exit");
            (Arc::new(MemoryStore::new()), None)
        }
    };

    let objects = LocalObjectStore::new(
        config.uploads.dir.clone(),
        config.uploads.public_prefix.clone(),
    )
    .await
    .with_context(|| format!("failed to prepare upload directory {}", config.uploads.dir.display()))?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, store, Arc::new(objects));

    if let Some(limiter) = state.rate_limiter.clone() {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            loop {
                ticker.tick().await;
                limiter.purge_expired().await;
            }
        });
    }

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Portfolio API listening on http://{}", bind_addr);

    axum::serve(
        listener,
        crate::app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    if let Some(manager) = manager {
        manager.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
