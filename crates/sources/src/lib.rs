//! # Sources Crate
//!
//! This crate implements the item sources that fill the swipe deck.
//!
//! ## Components
//!
//! ### Google Books Source (network)
//! Candidates from the public volumes search:
//! - Free-text search, subject search, curated rails
//! - A "popular" mix of five genre searches, merged and de-duplicated
//!
//! ### Fixed Source (in memory)
//! A small built-in catalog for offline sessions, with scripted responses
//! for tests.
//!
//! ### Retrying Source
//! Wraps any source with a per-attempt timeout and exponential backoff.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CandidateQuery, GoogleBooksSource, ItemSource, RetryingSource};
//! use std::time::Duration;
//!
//! let source = RetryingSource::new(GoogleBooksSource::new()?)
//!     .with_timeout(Duration::from_secs(10));
//!
//! let books = source.fetch_candidates(&CandidateQuery::Popular).await?;
//! ```

// Public modules
pub mod error;
pub mod fixed;
pub mod google_books;
pub mod popular;
pub mod rails;
pub mod retry;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, SourceError};
pub use fixed::{sample_catalog, FixedSource};
pub use google_books::GoogleBooksSource;
pub use rails::CuratedRail;
pub use retry::RetryingSource;
pub use traits::{CandidateQuery, ItemSource};
