use anyhow::{Context, Result};
use std::net::SocketAddr;

use api::{create_router, AppState};
use common::bootstrap::{init_stores, seed_users};
use common::config::Settings;
use common::telemetry::{init_logging, init_metrics, shutdown_tracer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Settings::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    init_logging(
        &config.observability.log_level,
        config.observability.log_format,
        config.observability.tracing_endpoint.as_deref(),
    )?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        backend = ?config.storage.backend,
        "Starting API server"
    );

    let metrics_handle = init_metrics()?;
    let stores = init_stores(&config).await?;
    let db_pool = stores.pool.clone();

    // Create application state
    let state = AppState::new(stores, config.clone()).with_metrics(metrics_handle);
    seed_users(&state.auth, &config.auth.seed_users).await?;

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .context("Invalid server host")?,
        config.server.port,
    ));
    tracing::info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = db_pool {
        pool.close().await;
    }
    shutdown_tracer();
    tracing::info!("API server stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Initiating graceful shutdown");
}
