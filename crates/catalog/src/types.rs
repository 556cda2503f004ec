//! Core domain types for swipeable books.
//!
//! A [`Book`] is the one swipeable unit the rest of the workspace moves
//! around. It is created at the adapter boundary (see [`crate::parser`]) and
//! never mutated afterwards; enrichment such as a generated blurb produces a
//! new value through [`Book::with_blurb`].

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a book, as issued by the item source
pub type BookId = String;

/// Author label used when the source has no author information
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Title used when the source has no title
pub const UNTITLED: &str = "Untitled";

// =============================================================================
// Book
// =============================================================================

/// A candidate book shown on a swipe card.
///
/// Invariant: `authors` is never empty. Constructors and [`Book::with_authors`]
/// fall back to [`UNKNOWN_AUTHOR`], and so does deserialization. Code that
/// edits `authors` directly must keep it non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    #[serde(default = "unknown_authors", deserialize_with = "deserialize_authors")]
    pub authors: Vec<String>,
    /// Cover image reference; `None` means "show a placeholder"
    pub cover_url: Option<String>,
    pub description: Option<String>,
    /// Raw publication date as reported by the source ("2021", "2021-05-04", ...)
    pub published_date: Option<String>,
    pub published_year: Option<u16>,
    pub page_count: Option<u32>,
    /// Tags / categories; empty when the source has none
    pub categories: Vec<String>,
    /// Short generated blurb, filled in by enrichment
    pub blurb: Option<String>,
}

impl Book {
    /// Create a book with only an id and a title.
    pub fn new(id: impl Into<BookId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: vec![UNKNOWN_AUTHOR.to_string()],
            cover_url: None,
            description: None,
            published_date: None,
            published_year: None,
            page_count: None,
            categories: Vec::new(),
            blurb: None,
        }
    }

    /// Set the author list. Blank names are dropped; an empty result falls
    /// back to [`UNKNOWN_AUTHOR`].
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = normalize_authors(authors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_cover_url(mut self, url: impl Into<String>) -> Self {
        self.cover_url = Some(url.into());
        self
    }

    /// Set the publication date and derive the year from its leading digits.
    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        let date = date.into();
        self.published_year = year_from_date(&date);
        self.published_date = Some(date);
        self
    }

    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Return a copy of this book carrying the given blurb.
    pub fn with_blurb(mut self, blurb: impl Into<String>) -> Self {
        self.blurb = Some(blurb.into());
        self
    }

    /// First listed author. Always present because `authors` is non-empty.
    pub fn primary_author(&self) -> &str {
        self.authors
            .first()
            .map(String::as_str)
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Authors joined for display ("A, B").
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Text to show on the back of the card: blurb, then description, then a
    /// placeholder.
    pub fn summary(&self) -> &str {
        self.blurb
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("No description available.")
    }
}

fn unknown_authors() -> Vec<String> {
    vec![UNKNOWN_AUTHOR.to_string()]
}

/// Drop blank author names, falling back to [`UNKNOWN_AUTHOR`].
fn normalize_authors(authors: Vec<String>) -> Vec<String> {
    let authors: Vec<String> = authors
        .into_iter()
        .filter(|a| !a.trim().is_empty())
        .collect();
    if authors.is_empty() {
        unknown_authors()
    } else {
        authors
    }
}

fn deserialize_authors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer).map(normalize_authors)
}

/// Extract the year from a date such as "1999", "1999-04" or "1999-04-12".
pub fn year_from_date(date: &str) -> Option<u16> {
    let head = date.trim().split('-').next()?;
    if head.len() != 4 {
        return None;
    }
    head.parse().ok()
}
