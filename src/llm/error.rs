//! Error types for the upstream layer

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the upstream aggregator
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Missing credentials or unusable settings; raised before any network call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No response or no further data within the allowed time
    #[error("Upstream timed out after {0:?}")]
    Timeout(Duration),

    /// DNS, connection reset, TLS and other transport failures
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A non-streaming response could not be decoded
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// Classify a reqwest failure; `limit` is the timeout that was in force
    pub fn from_reqwest(err: reqwest::Error, limit: Duration) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(limit)
        } else if err.is_decode() {
            UpstreamError::InvalidResponse(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}
