//! Unified error types for `PageScope`.

use thiserror::Error;

/// The main error type for `PageScope` operations.
#[derive(Debug, Error)]
pub enum PageScopeError {
    /// Upstream fetch errors
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Local store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Every required page of a load failed
    #[error("Failed to load catalog pages: {first}")]
    AllPagesFailed {
        /// The first failure observed, kept as the representative cause.
        first: UpstreamError,
    },
}

/// Errors related to upstream catalog requests.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status other than the normalized no-match 404
    #[error("Upstream returned status {status} for {resource}")]
    Status {
        /// HTTP status code received
        status: u16,
        /// Human-readable description of the requested resource
        resource: String,
    },

    /// Single-item lookup for an id the upstream does not know
    #[error("Character not found: {0}")]
    NotFound(u64),

    /// Response body did not match the expected envelope
    #[error("Malformed upstream response: {0}")]
    Decode(String),
}

/// Errors related to local favorites persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted payload could not be read or written as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
