//! # Catalog Crate
//!
//! Book types and the adapter that turns a book-search response into them.
//!
//! ## Main Components
//!
//! - **types**: the [`Book`] candidate item and its helpers
//! - **parser**: decode and normalize the Google Books `volumes` shape
//! - **error**: error types for decoding
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::parse_volumes;
//!
//! let books = parse_volumes(&body)?;
//! for book in &books {
//!     println!("{} by {}", book.title, book.author_line());
//! }
//! ```

pub mod error;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use parser::{books_from_response, enhance_cover_url, parse_volumes, VolumesResponse};
pub use types::{year_from_date, Book, BookId, UNKNOWN_AUTHOR, UNTITLED};
