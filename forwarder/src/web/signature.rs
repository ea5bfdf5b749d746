//! Resend webhook signature verification.
//!
//! Resend delivers webhooks through Svix, which signs each request with
//! HMAC-SHA256 over `{svix-id}.{svix-timestamp}.{raw body}`. The
//! `svix-signature` header carries one or more space-separated
//! `version,base64` tokens so keys can be rotated.
//! Reference: https://docs.svix.com/receiving/verifying-payloads/how-manual

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DEFAULT_TOLERANCE_SECS;

type HmacSha256 = Hmac<Sha256>;

/// Prefix Resend puts in front of the base64 signing secret.
pub const SECRET_PREFIX: &str = "whsec_";

/// The only signature version this receiver checks.
pub const SIGNATURE_VERSION: &str = "v1";

/// The signing secret itself is unusable.
///
/// This is a configuration fault on the receiving side, never a verdict about
/// the request.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signing secret is not valid base64: {0}")]
    InvalidSecret(#[from] base64::DecodeError),

    #[error("signing secret decodes to an empty key")]
    EmptySecret,

    #[error("signing key rejected by HMAC")]
    InvalidKeyLength,
}

/// Outcome of checking a well-configured request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Rejected(Rejection),
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified)
    }
}

/// Why a request was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("timestamp is not an integer")]
    InvalidTimestamp,

    #[error("timestamp is {age_seconds}s away from now")]
    Stale { age_seconds: u64 },

    #[error("no matching signature")]
    NoMatchingSignature,
}

/// Strip the optional `whsec_` prefix and decode the key bytes.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, SignatureError> {
    let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
    let key = STANDARD.decode(encoded)?;

    if key.is_empty() {
        return Err(SignatureError::EmptySecret);
    }

    Ok(key)
}

/// Compute the `v1,<base64>` token for a message.
///
/// `timestamp` must be the header value exactly as received and `body` the
/// raw request bytes; re-encoding either breaks the signature.
pub fn sign_payload(
    key: &[u8],
    message_id: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, SignatureError> {
    Ok(format!("{},{}", SIGNATURE_VERSION, compute_digest(key, message_id, timestamp, body)?))
}

fn compute_digest(
    key: &[u8],
    message_id: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|_| SignatureError::InvalidKeyLength)?;

    mac.update(message_id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify a webhook against the system clock with the default 300s window.
pub fn verify_webhook_signature(
    secret: &str,
    message_id: &str,
    timestamp: &str,
    signature_header: &str,
    body: &[u8],
) -> Result<Verification, SignatureError> {
    verify_webhook_signature_at(
        secret,
        message_id,
        timestamp,
        signature_header,
        body,
        unix_now(),
        DEFAULT_TOLERANCE_SECS,
    )
}

/// Verify a webhook as of `now_seconds`.
///
/// Steps run in order and the first failing one decides:
///
/// 1. `timestamp` must be an integer within `tolerance_seconds` of now
///    (inclusive, in either direction)
/// 2. the secret must decode, otherwise [`SignatureError`] is returned
/// 3. `v1,<digest>` must match one of the header tokens exactly
///
/// Tokens with other versions are skipped, not treated as invalid.
pub fn verify_webhook_signature_at(
    secret: &str,
    message_id: &str,
    timestamp: &str,
    signature_header: &str,
    body: &[u8],
    now_seconds: i64,
    tolerance_seconds: u64,
) -> Result<Verification, SignatureError> {
    let sent_at: i64 = match timestamp.parse() {
        Ok(t) => t,
        Err(_) => {
            warn!(message_id = %message_id, timestamp = %timestamp, "webhook_signature_invalid_timestamp");
            return Ok(Verification::Rejected(Rejection::InvalidTimestamp));
        }
    };

    let age = now_seconds.abs_diff(sent_at);
    if age > tolerance_seconds {
        warn!(
            message_id = %message_id,
            webhook_time = sent_at,
            current_time = now_seconds,
            age_seconds = age,
            max_age_seconds = tolerance_seconds,
            "webhook_signature_stale"
        );
        return Ok(Verification::Rejected(Rejection::Stale { age_seconds: age }));
    }

    let key = decode_secret(secret)?;
    let expected = compute_digest(&key, message_id, timestamp, body)?;

    if matches_any_token(&expected, signature_header) {
        debug!(message_id = %message_id, "webhook_signature_verified");
        return Ok(Verification::Verified);
    }

    warn!(
        message_id = %message_id,
        token_count = signature_header.split_whitespace().count(),
        "webhook_signature_mismatch"
    );
    Ok(Verification::Rejected(Rejection::NoMatchingSignature))
}

/// Compare `expected` with every `v1` token of the header.
///
/// Each comparison is constant-time and all tokens are visited.
fn matches_any_token(expected: &str, signature_header: &str) -> bool {
    signature_header
        .split_whitespace()
        .filter_map(|token| token.split_once(','))
        .filter(|(version, _)| *version == SIGNATURE_VERSION)
        .fold(false, |found, (_, digest)| {
            let equal: bool = digest.as_bytes().ct_eq(expected.as_bytes()).into();
            found | equal
        })
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    i64::try_from(secs).unwrap_or(i64::MAX)
}
