//! Outbound forwarding through the provider's email-send API.
//!
//! ```text
//! ForwardRequest → EmailForwarder::forward() → ForwardOutcome
//! ```

pub mod resend;
pub mod types;

pub use resend::EmailForwarder;
pub use types::{ForwardOutcome, ForwardRequest};
