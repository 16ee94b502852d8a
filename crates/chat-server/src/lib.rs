//! Chat Room Server Library
//!
//! Participants register a name, post and read messages, and are evicted by a
//! background sweep once they stop sending heartbeats.

pub mod chat;
pub mod core;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::chat::Sweeper;
use crate::core::{AppState, ChatServerConfig};

/// Build the HTTP application around an already opened store.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(crate::core::router())
        .merge(crate::chat::router())
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run(config: ChatServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    info!("=== Chat Server ===");
    info!("Store: {:?}", config.store);

    let store = config.open_store().await?;
    let state = AppState::new(config.clone(), store.clone());

    let sweeper = Sweeper::from_config(store, &config).spawn();

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Chat server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
