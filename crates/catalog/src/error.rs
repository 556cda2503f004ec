//! Error types for the catalog crate.
//!
//! Malformed fields inside a volume (missing authors, missing images) are not
//! errors: they are normalized to safe defaults by the parser. Only a response
//! body that cannot be read at all ends up here.

use thiserror::Error;

/// Errors that can occur while decoding a book-search response
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Response body was not valid JSON, or did not have the volumes shape
    #[error("Failed to decode volumes response: {0}")]
    Json(#[from] serde_json::Error),

    /// A volume arrived without the one field we cannot invent
    #[error("Volume at position {index} has an empty id")]
    MissingId { index: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
