//! Errors returned by the TMDB client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TmdbError {
    /// Transport failure (connect, timeout, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// TMDB answered with a non-success status
    #[error("TMDB returned status {status} for {endpoint}: {body}")]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl TmdbError {
    /// Whether another attempt could succeed
    ///
    /// Transport errors, rate limiting and server errors are retried; other
    /// client errors (401, 404, ...) are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            TmdbError::Request(_) => true,
            TmdbError::Status { status, .. } => *status == 429 || *status >= 500,
            TmdbError::Decode { .. } | TmdbError::Config(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TmdbError::Status { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, TmdbError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> TmdbError {
        TmdbError::Status {
            status: code,
            endpoint: "movie/1".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn test_retry_classification() {
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!TmdbError::Config("missing key".to_string()).is_retryable());
    }

    #[test]
    fn test_not_found() {
        assert!(status(404).is_not_found());
        assert!(!status(500).is_not_found());
        assert_eq!(
            status(404).to_string(),
            "TMDB returned status 404 for movie/1: "
        );
    }
}
