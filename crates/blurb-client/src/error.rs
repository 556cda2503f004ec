use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when asking a service for a blurb
#[derive(Error, Debug)]
pub enum BlurbError {
    #[error("No API key: set {0} to enable generated blurbs")]
    MissingApiKey(String),

    #[error("Ill-formed value in {0} environment variable")]
    InvalidApiKeyEnv(String),

    #[error("Invalid blurb service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to reach blurb service: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Blurb service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Blurb service returned no text")]
    EmptyResponse,

    #[error("Blurb service did not answer within {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, BlurbError>;
