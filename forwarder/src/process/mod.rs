//! Webhook payload processing module.
//!
//! Turns a verified raw webhook body into the request that forwards it.
//!
//! ```text
//! raw body → extract_email() → InboundEmail → build_forward_request() → ForwardRequest
//! ```

pub mod payload;

pub use payload::{build_forward_request, extract_email, InboundEmail, PayloadError};
