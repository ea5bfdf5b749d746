//! Web server module for handling inbound webhooks.
//!
//! This module provides the HTTP entry point that:
//! - Receives signed webhooks from Resend
//! - Verifies the Svix signature before anything else reads the body
//! - Forwards the caught email with one provider call
//! - Maps every failure to a distinct status code

pub mod error;
pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::WebhookError;
pub use handlers::{health, resend_webhook, AppState, HealthResponse, WebhookResponse};
pub use signature::{
    decode_secret, sign_payload, verify_webhook_signature, verify_webhook_signature_at,
    Rejection, SignatureError, Verification,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/resend", post(resend_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
