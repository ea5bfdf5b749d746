//! Catchmail - forwards inbound Resend emails to a fixed address.
//!
//! This library provides the modules behind the `catchmail-web` binary:
//! - `web::signature`: Svix webhook signature verification
//! - `forward`: the Resend email-send client
//! - `process`: payload extraction from verified webhook bodies
//!
//! ## Architecture
//!
//! ```text
//! Webhook → verify signature → extract email → Resend /emails → forward address
//! ```

pub mod config;
pub mod forward;
pub mod process;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use forward::{EmailForwarder, ForwardOutcome, ForwardRequest};
pub use process::{extract_email, InboundEmail};
pub use web::{verify_webhook_signature, AppState, Verification, WebhookError};
