//! HubRelay server - verifies page notifications and relays them to services.
//!
//! This binary:
//! - Answers the platform's subscription handshake
//! - Verifies `x-hub-signature` on every notification
//! - Fans each item out to the services subscribed to it
//! - Responds once every delivery has settled

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hubrelay::{
    load_services, router, AppState, Config, Dispatcher, FieldTable, HttpDeliverer,
    RpcDeliverer, RpcRegistry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_starting");

    // Load configuration
    let config = Config::from_env();
    let services = load_services(&config.services_file)
        .with_context(|| format!("Failed to load services from {}", config.services_file))?;
    info!(
        port = config.port,
        signature_verification = config.app_secret.is_some(),
        verify_token_configured = config.verify_token.is_some(),
        services = services.len(),
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    if config.app_secret.is_none() {
        warn!("signature_verification_disabled");
    }

    // Shared HTTP client for both transports
    let client = Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .pool_max_idle_per_host(100)
        .build()
        .context("Failed to create HTTP client")?;

    let registry = Arc::new(RpcRegistry::connect(&services, &client));
    if !registry.is_empty() {
        info!(rpc_clients = registry.len(), "rpc_registry_ready");
    }

    let dispatcher = Dispatcher::new(
        services,
        FieldTable::default(),
        Arc::new(HttpDeliverer::new(client)),
        Arc::new(RpcDeliverer::new(registry)),
    );
    info!(services = dispatcher.services().len(), "dispatcher_ready");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, dispatcher));

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("relay_shutting_down");
}
