use anyhow::Result;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod models;
mod password;
mod repositories;
mod routes;
mod service;
mod state;
mod validation;

use axum::Router;
use common::database::{DatabaseConfig, init_pool, migrate};
use tokio::{net::TcpListener, signal, sync::watch};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig, repositories::PgUserRepository, service::UserService, state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting user service");

    // Initialize database connection pool and schema
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    migrate(&pool).await?;

    let server_config = ServerConfig::from_env()?;

    let user_service = UserService::new(PgUserRepository::new(pool.clone()));
    let app = routes::with_request_timeout(
        routes::create_router(AppState::new(user_service)),
        server_config.request_timeout,
    )
    .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(server_config.addr).await?;
    info!("User service listening on {}", server_config.addr);

    serve(listener, app, server_config.shutdown_grace_period).await?;

    pool.close().await;
    info!("User service stopped");

    Ok(())
}

/// Serve until a shutdown signal arrives, then give in-flight requests
/// `grace_period` to finish before dropping them.
async fn serve(listener: TcpListener, app: Router, grace_period: Duration) -> Result<()> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(());

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => return Ok(result??),
        _ = shutdown_signal() => {}
    }

    info!(
        "Gracefully shutting down, waiting up to {:?} for open requests",
        grace_period
    );
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(grace_period, &mut server).await {
        Ok(result) => result??,
        Err(_) => {
            warn!("Grace period elapsed, closing remaining connections");
            server.abort();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
