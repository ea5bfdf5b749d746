//! Resend email-send client.

use std::sync::Arc;

use reqwest::Client;
use tracing::{error, info, warn};
use url::Url;

use super::types::{ForwardOutcome, ForwardRequest, SendResponse};
use crate::config::DEFAULT_RESEND_API_URL;

/// Sends forwarded emails through the Resend API.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct EmailForwarder {
    inner: Arc<ForwarderInner>,
}

struct ForwarderInner {
    client: Client,
    endpoint: Url,
}

impl EmailForwarder {
    /// Create a forwarder posting to `endpoint`.
    pub fn new(endpoint: Url) -> Self {
        Self {
            inner: Arc::new(ForwarderInner {
                client: Client::new(),
                endpoint,
            }),
        }
    }

    /// Create a forwarder for the public Resend endpoint.
    pub fn resend() -> Self {
        Self::new(Url::parse(DEFAULT_RESEND_API_URL).expect("default URL is valid"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Send one email.
    ///
    /// Exactly one request is made. Failures are reported through the
    /// outcome, never retried.
    pub async fn forward(&self, request: &ForwardRequest) -> ForwardOutcome {
        info!(
            to = %request.to,
            subject_length = request.subject.len(),
            html_length = request.html.len(),
            "forward_send_starting"
        );

        let response = match self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .bearer_auth(&request.api_key)
            .json(request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_connect() {
                    error!(endpoint = %self.inner.endpoint, error = %e, "forward_send_connect_error");
                } else {
                    error!(endpoint = %self.inner.endpoint, error = %e, "forward_send_error");
                }
                return ForwardOutcome::TransportFailed(e.to_string());
            }
        };

        let status = response.status();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!(status_code = status.as_u16(), error = %e, "forward_response_read_error");
                return ForwardOutcome::TransportFailed(e.to_string());
            }
        };

        if !status.is_success() {
            warn!(
                status_code = status.as_u16(),
                response_preview = %body.chars().take(200).collect::<String>(),
                "forward_provider_rejected"
            );
            return ForwardOutcome::ProviderRejected {
                status: status.as_u16(),
                body,
            };
        }

        let id = serde_json::from_str::<SendResponse>(&body)
            .ok()
            .and_then(|r| r.id);

        info!(status_code = status.as_u16(), email_id = ?id, "forward_send_complete");

        ForwardOutcome::Sent { id }
    }
}
