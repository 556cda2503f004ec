//! The item-source seam.
//!
//! Everything that can hand the deck a batch of books implements
//! [`ItemSource`]. The session only ever talks to this trait, so the Google
//! Books adapter, the offline catalog and the retrying wrapper are
//! interchangeable.

use crate::error::Result;
use crate::rails::CuratedRail;
use async_trait::async_trait;
use catalog::Book;
use std::fmt;
use std::sync::Arc;

/// What to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CandidateQuery {
    /// A mix of popular books across genres
    #[default]
    Popular,
    /// Free-text search (titles, authors, keywords)
    Search(String),
    /// Books in one subject / category
    Category(String),
    /// One of the curated explore rails
    Rail(CuratedRail),
}

impl CandidateQuery {
    /// Search terms understood by a full-text book search.
    ///
    /// `None` for `Popular`, which is a mix of several searches.
    pub fn search_terms(&self) -> Option<String> {
        match self {
            CandidateQuery::Popular => None,
            CandidateQuery::Search(text) => Some(text.trim().to_string()),
            CandidateQuery::Category(name) => Some(format!("subject:{}", name.trim())),
            CandidateQuery::Rail(rail) => Some(rail.query().to_string()),
        }
    }
}

impl fmt::Display for CandidateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateQuery::Popular => write!(f, "popular"),
            CandidateQuery::Search(text) => write!(f, "search '{}'", text),
            CandidateQuery::Category(name) => write!(f, "category '{}'", name),
            CandidateQuery::Rail(rail) => write!(f, "rail '{}'", rail.title()),
        }
    }
}

/// Core trait for anything that produces candidate books.
///
/// ## Design Note
/// - `Send + Sync` so a source can be shared behind an `Arc` across tasks
/// - Implementations normalize malformed data themselves; an `Err` means the
///   fetch as a whole failed and the caller should keep its current deck
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Returns the name of this source (for logging/debugging)
    fn name(&self) -> &str;

    /// Fetch one batch of candidates for `query`.
    async fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Book>>;
}

#[async_trait]
impl<T: ItemSource + ?Sized> ItemSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Book>> {
        (**self).fetch_candidates(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_terms() {
        assert_eq!(CandidateQuery::Popular.search_terms(), None);
        assert_eq!(
            CandidateQuery::Search(" dune ".into()).search_terms().as_deref(),
            Some("dune")
        );
        assert_eq!(
            CandidateQuery::Category("Fantasy".into()).search_terms().as_deref(),
            Some("subject:Fantasy")
        );
    }
}
