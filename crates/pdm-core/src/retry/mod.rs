//! Retry and backoff policy.
//!
//! This module encapsulates error classification (timeouts, throttling,
//! connection and stream failures) and exponential backoff decisions so the
//! scheduler and the transports share one notion of "transient".

mod classify;
mod error;
mod policy;

pub use classify::{classify, classify_curl_error, classify_status};
pub use error::TransportError;
pub use policy::{ErrorKind, Jitter, RetryDecision, RetryPolicy};
