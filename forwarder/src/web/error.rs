//! Webhook error kinds and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::handlers::WebhookResponse;
use super::signature::{Rejection, SignatureError};
use crate::config::ConfigError;
use crate::process::PayloadError;

/// Every way a webhook can fail.
///
/// Misconfiguration (`500`) is kept apart from a caller that failed
/// authentication (`401`).
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    MalformedInput(String),

    #[error("{0}")]
    Provider(String),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            WebhookError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            WebhookError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn status(&self) -> &'static str {
        match self {
            WebhookError::Unauthorized(_) => "unauthorized",
            WebhookError::Configuration(_) => "misconfigured",
            WebhookError::MalformedInput(_) => "bad_request",
            WebhookError::Provider(_) => "not_forwarded",
        }
    }
}

impl From<ConfigError> for WebhookError {
    fn from(e: ConfigError) -> Self {
        WebhookError::Configuration(e.to_string())
    }
}

impl From<SignatureError> for WebhookError {
    fn from(e: SignatureError) -> Self {
        WebhookError::Configuration(e.to_string())
    }
}

impl From<Rejection> for WebhookError {
    fn from(r: Rejection) -> Self {
        WebhookError::Unauthorized(r.to_string())
    }
}

impl From<PayloadError> for WebhookError {
    fn from(e: PayloadError) -> Self {
        WebhookError::MalformedInput(e.to_string())
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let body = WebhookResponse {
            status: self.status(),
            reason: Some(self.to_string()),
            email_id: None,
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebhookError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::Configuration("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::MalformedInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::Provider("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_secret_error_is_configuration() {
        let err: WebhookError = SignatureError::EmptySecret.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rejection_is_unauthorized() {
        let err: WebhookError = Rejection::Stale { age_seconds: 400 }.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "timestamp is 400s away from now");
    }

    #[test]
    fn test_missing_config_is_configuration() {
        let err: WebhookError = ConfigError::Missing("FORWARD_TO").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("FORWARD_TO"));
    }
}
