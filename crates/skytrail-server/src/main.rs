//! Skytrail Server - aircraft trajectory tracking backend

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skytrail_server::api;
use skytrail_server::config::Config;
use skytrail_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("skytrail_server=debug".parse()?))
        .init();

    tracing::info!("Starting Skytrail Server...");

    let config = Config::from_env();
    let port = config.server_port;
    tracing::info!(
        backend = %config.backend_url,
        poll_interval_ms = config.poll_interval_ms,
        max_points = config.max_points,
        "Loaded configuration"
    );

    let state = Arc::new(AppState::from_config(config)?);

    let app = api::routes()
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let stopped = state.tracker().stop_all_tracking();
    tracing::info!("Shutdown complete, stopped {} tracking session(s)", stopped);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
