//! Main Entrypoint for the Parley Token Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Constructing the LiveKit-backed signer and dispatcher.
//! 4. Building the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use parley_api::{config::Config, router::create_router, state::AppState};
use parley_core::{AgentDispatcher, LiveKitDispatcher, LiveKitSigner, TokenSigner};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Signing and Dispatch ---
    let signer: Arc<dyn TokenSigner> =
        Arc::new(LiveKitSigner::new(&config.api_key, &config.api_secret));
    let dispatcher: Arc<dyn AgentDispatcher> = Arc::new(LiveKitDispatcher::new(
        &config.livekit_url,
        &config.api_key,
        &config.api_secret,
    ));

    let app_state = Arc::new(AppState {
        signer,
        dispatcher,
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router and Apply Middleware ---
    // Allow-all CORS so mobile clients can fetch tokens directly.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        livekit_url = %config.livekit_url,
        api_key = %config.api_key,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
