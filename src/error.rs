//! Error types for the provider clients.
//!
//! Pipelines work with `anyhow::Result`; the HTTP clients return this
//! typed error so the retry layer can tell transient failures apart
//! from permanent ones.

use thiserror::Error;

/// Errors surfaced by the provider HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The provider rejected the request for quota reasons (HTTP 429).
    /// The client's own throttling should prevent this in normal operation.
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other non-2xx response from the provider.
    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("network error: {0}")]
    Network(String),

    /// The provider returned 2xx but the body did not match the expected shape.
    #[error("failed to parse provider response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether the retry layer should try again.
    ///
    /// Network errors and 5xx responses are transient; 4xx responses
    /// (including 429) fail immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Provider { status, .. } => *status >= 500,
            ApiError::RateLimited(_) | ApiError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = ApiError::Provider {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_permanent() {
        let err = ApiError::Provider {
            status: 404,
            message: "not found".to_string(),
        };
        assert!(!err.is_transient());
        assert!(!ApiError::RateLimited("quota".to_string()).is_transient());
    }

    #[test]
    fn network_errors_are_transient() {
        assert!(ApiError::Network("connection reset".to_string()).is_transient());
    }
}
