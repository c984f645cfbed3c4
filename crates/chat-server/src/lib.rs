//! Chat Server Library
//!
//! Single-room chat backend: participants register and ping to stay
//! present, post broadcast or directed messages and poll for the ones they
//! may see. A background sweeper evicts idle participants.

pub mod chat;
pub mod core;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::chat::sweeper::Sweeper;
use crate::core::{AppState, ChatServerConfig};

/// Builds the full HTTP application over `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(chat::router())
        .route("/health", get(health_check))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by an embedding binary or test
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    info!("=== Chat Server ===");

    let config = ChatServerConfig::from_env()?;
    info!("Store: {:?}", config.store);
    info!(
        "Presence: sweep every {:?}, idle timeout {:?}",
        config.sweep_interval, config.idle_timeout
    );

    let store = config.store.open().await?;
    let state = AppState::with_system_clock(config.clone(), store);

    let sweeper = Sweeper::from_state(&state).spawn();
    info!("Presence sweeper started");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Chat server listening on http://{}", addr);

    let served = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sweeper.abort();
    info!("Chat server stopped");

    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn health_check() -> &'static str {
    "OK - Chat Server"
}
