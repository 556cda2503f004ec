//! Errors returned by item sources.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching candidates
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid source URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The service answered, but not with success
    #[error("Source returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Could not decode source response: {0}")]
    Decode(#[from] catalog::CatalogError),

    #[error("Source did not answer within {0:?}")]
    Timeout(Duration),

    /// Background decoding task died
    #[error("Decode task failed: {0}")]
    Task(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Whether trying the same request again might succeed.
    ///
    /// Client errors (4xx other than 429), bad URLs and undecodable bodies
    /// will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Http(_) | SourceError::Timeout(_) | SourceError::Unavailable(_) => true,
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            SourceError::InvalidUrl(_) | SourceError::Decode(_) | SourceError::Task(_) => false,
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let status = |status| SourceError::Status {
            status,
            url: "https://example.com".to_string(),
        };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(SourceError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!SourceError::Task("panicked".into()).is_retryable());
    }
}
