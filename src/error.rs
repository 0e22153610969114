//! Error types for ghstatus
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while talking to the GitHub API
///
/// Listing failures are user-scoped and non-fatal: the driver prints a
/// warning carrying the Display string of the error and moves on to the
/// next user, so these messages are part of the console output contract.
#[derive(Debug, Error)]
pub enum GhStatusError {
    /// API quota exhausted (403 with x-ratelimit-remaining: 0)
    #[error("rate limit exceeded")]
    RateLimited,

    /// Any other non-success HTTP status from the API
    #[error("request failed with status {0}")]
    Status(reqwest::StatusCode),

    /// Transport-level failure (DNS, connect, timeout, body decode)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for ghstatus operations
pub type Result<T> = std::result::Result<T, GhStatusError>;
