//! Webhook endpoint handlers.
//!
//! The webhook handler runs, in order:
//! 1. Check the forwarding configuration is complete
//! 2. Verify the Svix signature over the raw body
//! 3. Extract the email fields
//! 4. Forward them with a single provider call

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use super::error::WebhookError;
use super::signature::{unix_now, verify_webhook_signature_at, Verification};
use crate::forward::{EmailForwarder, ForwardOutcome};
use crate::process::{build_forward_request, extract_email};
use crate::Config;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forwarder: EmailForwarder,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let forwarder = EmailForwarder::new(config.resend_api_url.clone());
        Self {
            config: Arc::new(config),
            forwarder,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Resend Webhook
// =============================================================================

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}

/// Resend webhook endpoint.
///
/// `body` is taken as raw bytes because the signature covers them exactly.
pub async fn resend_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookError> {
    let settings = state.config.forward_settings().map_err(|e| {
        error!(error = %e, "webhook_config_incomplete");
        WebhookError::from(e)
    })?;

    let message_id = required_header(&headers, HEADER_ID)?;
    let timestamp = required_header(&headers, HEADER_TIMESTAMP)?;
    let signature = required_header(&headers, HEADER_SIGNATURE)?;

    info!(
        message_id = %message_id,
        body_length = body.len(),
        "resend_webhook_received"
    );

    let verification = verify_webhook_signature_at(
        settings.webhook_secret,
        message_id,
        timestamp,
        signature,
        &body,
        unix_now(),
        state.config.tolerance_secs,
    )
    .map_err(|e| {
        error!(message_id = %message_id, error = %e, "webhook_secret_invalid");
        WebhookError::from(e)
    })?;

    if let Verification::Rejected(rejection) = verification {
        warn!(message_id = %message_id, reason = %rejection, "resend_webhook_unauthorized");
        return Err(rejection.into());
    }

    let email = extract_email(&body).map_err(|e| {
        warn!(message_id = %message_id, error = %e, "resend_webhook_malformed");
        WebhookError::from(e)
    })?;

    let request = build_forward_request(&email, &settings);

    match state.forwarder.forward(&request).await {
        ForwardOutcome::Sent { id } => {
            info!(message_id = %message_id, email_id = ?id, "resend_webhook_forwarded");
            Ok(Json(WebhookResponse {
                status: "forwarded",
                reason: None,
                email_id: id,
            }))
        }
        ForwardOutcome::ProviderRejected { status, body } => {
            error!(message_id = %message_id, status_code = status, "resend_webhook_forward_rejected");
            Err(WebhookError::Provider(format!(
                "provider rejected email ({}): {}",
                status, body
            )))
        }
        ForwardOutcome::TransportFailed(details) => {
            error!(message_id = %message_id, error = %details, "resend_webhook_forward_failed");
            Err(WebhookError::Provider(format!(
                "provider unreachable: {}",
                details
            )))
        }
    }
}

fn required_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!(header = name, "resend_webhook_header_missing");
            WebhookError::Unauthorized(format!("missing {} header", name))
        })
}
