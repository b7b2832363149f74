//! Transfer error type for retry classification.

use thiserror::Error;

use crate::protocol::Protocol;

/// Error returned by a single transfer attempt.
/// Kept concrete so the scheduler can classify it before deciding on a retry.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, ssh session, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Server answered with a failure status (HTTP >= 400).
    #[error("server returned status {0}")]
    Status(u32),
    /// The URL could not be turned into a connection target (host, port,
    /// credentials). Treated like a failed connect.
    #[error("cannot connect to {url}: {reason}")]
    Target { url: String, reason: String },
    /// Local disk write failed (disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// No transport handles this protocol. Not retried.
    #[error("no transport registered for {0}")]
    NoTransport(Protocol),
    /// The attempt died without returning (panicked or was cancelled). Not retried.
    #[error("transfer aborted: {0}")]
    Aborted(String),
}
