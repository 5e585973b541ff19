//! Web server module for the relay endpoint.
//!
//! This module provides:
//! - The root endpoint that answers handshakes and relays notifications
//! - Signature verification over raw request bodies
//! - A health check

pub mod handlers;
pub mod handshake;
pub mod signature;

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, relay_webhook, AppState, HealthResponse};
pub use handshake::{authorize, HubQuery};
pub use signature::{
    compute_signature, is_signature_verification_enabled, verify_signature, SIGNATURE_HEADER,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(relay_webhook))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
