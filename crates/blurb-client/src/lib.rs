//! # Blurb Client
//!
//! Short, engaging descriptions for cards.
//!
//! A [`BlurbGenerator`] turns a title, author and optional description into
//! a one or two sentence pitch. [`GroqClient`] is the hosted implementation;
//! [`BlurbService`] wraps any generator with a timeout and falls back to a
//! locally built blurb whenever generation is unavailable or fails.
//!
//! ## Example Usage
//!
//! ```ignore
//! use blurb_client::{BlurbRequest, BlurbService};
//!
//! let service = BlurbService::from_env()?;
//! let blurb = service.blurb(&BlurbRequest::from_book(&book)).await;
//! ```

pub mod error;
pub mod fallback;
pub mod groq;
pub mod service;

pub use error::{BlurbError, Result};
pub use fallback::{fallback_blurb, BLURB_MAX_CHARS};
pub use groq::GroqClient;
pub use service::BlurbService;

use async_trait::async_trait;
use catalog::Book;

/// What a generator needs to know about a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlurbRequest {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
}

impl BlurbRequest {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.primary_author().to_string(),
            description: book.description.clone(),
        }
    }
}

/// Anything that can write a blurb
#[async_trait]
pub trait BlurbGenerator: Send + Sync {
    /// Get the name of this generator (for logging)
    fn name(&self) -> &str;

    async fn generate(&self, request: &BlurbRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_book() {
        let book = Book::new("x", "Circe").with_authors(["Madeline Miller", "Someone Else"]);
        let request = BlurbRequest::from_book(&book);
        assert_eq!(request.title, "Circe");
        assert_eq!(request.author, "Madeline Miller");
        assert_eq!(request.description, None);
    }

    #[test]
    fn test_request_from_book_without_authors() {
        let request = BlurbRequest::from_book(&Book::new("x", "Anonymous Tales"));
        assert_eq!(request.author, catalog::UNKNOWN_AUTHOR);
    }
}
