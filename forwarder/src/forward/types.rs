//! Message types for the outbound email-send call.

use serde::{Deserialize, Serialize};

/// One forwarded email, ready to hand to Resend.
///
/// Serializes to the provider's JSON body. The API key travels in the
/// `Authorization` header and is skipped here.
#[derive(Debug, Clone, Serialize)]
pub struct ForwardRequest {
    #[serde(skip)]
    pub api_key: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl ForwardRequest {
    pub fn new(
        api_key: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// Result of a single send attempt. Every variant is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Provider accepted the email
    Sent { id: Option<String> },
    /// Provider answered with a non-2xx status
    ProviderRejected { status: u16, body: String },
    /// The request never got a complete answer
    TransportFailed(String),
}

impl ForwardOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, ForwardOutcome::Sent { .. })
    }
}

/// Success body of `POST /emails`.
#[derive(Debug, Deserialize)]
pub(crate) struct SendResponse {
    pub id: Option<String>,
}
