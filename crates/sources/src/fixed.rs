//! Fixed Source - an in-memory catalog with optional scripted responses.
//!
//! Used for offline sessions and tests. Scripted responses are consumed in
//! order; once the script runs out, queries are answered from the catalog.

use crate::error::{Result, SourceError};
use crate::traits::{CandidateQuery, ItemSource};
use async_trait::async_trait;
use catalog::Book;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

#[derive(Debug, Clone)]
enum Scripted {
    Books(Vec<Book>),
    Failure(String),
}

/// Item source answering from memory
#[derive(Debug, Default)]
pub struct FixedSource {
    catalog: Vec<Book>,
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
}

impl FixedSource {
    pub fn new(catalog: Vec<Book>) -> Self {
        Self {
            catalog,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// The built-in offline catalog.
    pub fn sample() -> Self {
        Self::new(sample_catalog())
    }

    /// Queue a batch to return on the next unscripted call.
    pub fn with_batch(self, books: Vec<Book>) -> Self {
        self.push(Scripted::Books(books));
        self
    }

    /// Queue a failure to return on the next unscripted call.
    pub fn with_failure(self, reason: impl Into<String>) -> Self {
        self.push(Scripted::Failure(reason.into()));
        self
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(&self, scripted: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(scripted);
    }

    fn next_scripted(&self) -> Option<Scripted> {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn answer_from_catalog(&self, query: &CandidateQuery) -> Vec<Book> {
        let matches = |book: &Book, needle: &str| {
            let needle = needle.to_lowercase();
            book.title.to_lowercase().contains(&needle)
                || book.authors.iter().any(|a| a.to_lowercase().contains(&needle))
                || book
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        };

        match query {
            CandidateQuery::Popular | CandidateQuery::Rail(_) => self.catalog.clone(),
            CandidateQuery::Search(text) => self
                .catalog
                .iter()
                .filter(|book| matches(book, text.trim()))
                .cloned()
                .collect(),
            CandidateQuery::Category(name) => self
                .catalog
                .iter()
                .filter(|book| book.categories.iter().any(|c| c.eq_ignore_ascii_case(name.trim())))
                .cloned()
                .collect(),
        }
    }
}

#[async_trait]
impl ItemSource for FixedSource {
    fn name(&self) -> &str {
        "Fixed"
    }

    async fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Book>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_scripted() {
            Some(Scripted::Books(books)) => Ok(books),
            Some(Scripted::Failure(reason)) => Err(SourceError::Unavailable(reason)),
            None => {
                let books = self.answer_from_catalog(query);
                debug!("Fixed source answered {} with {} books", query, books.len());
                Ok(books)
            }
        }
    }
}

/// A small hand-picked catalog for offline use.
pub fn sample_catalog() -> Vec<Book> {
    vec![
        Book::new("offline-hail-mary", "Project Hail Mary")
            .with_authors(["Andy Weir"])
            .with_description(
                "Ryland Grace is the sole survivor on a desperate, last-chance mission. \
                 If he fails, humanity and the earth itself will perish.",
            )
            .with_published_date("2021-05-04")
            .with_page_count(496)
            .with_categories(["Fiction", "Science Fiction"]),
        Book::new("offline-book-lovers", "Book Lovers")
            .with_authors(["Emily Henry"])
            .with_description(
                "A literary agent and a brooding editor keep running into each other \
                 in a small town that looks a lot like the setting of a romance novel.",
            )
            .with_published_date("2022-05-03")
            .with_page_count(384)
            .with_categories(["Fiction", "Romance"]),
        Book::new("offline-chemistry", "Lessons in Chemistry")
            .with_authors(["Bonnie Garmus"])
            .with_description(
                "Chemist Elizabeth Zott finds herself the star of a beloved TV cooking \
                 show in 1960s California, and uses it to teach far more than recipes.",
            )
            .with_published_date("2022-04-05")
            .with_page_count(400)
            .with_categories(["Fiction", "Historical"]),
        Book::new("offline-fourth-wing", "Fourth Wing")
            .with_authors(["Rebecca Yarros"])
            .with_description(
                "Violet Sorrengail was supposed to enter the Scribe Quadrant. Instead she \
                 is ordered to join the dragon riders, where the only way out is to graduate or die.",
            )
            .with_published_date("2023-05-02")
            .with_page_count(528)
            .with_categories(["Fiction", "Fantasy"]),
        Book::new("offline-secret-history", "The Secret History")
            .with_authors(["Donna Tartt"])
            .with_published_date("1992")
            .with_page_count(559)
            .with_categories(["Fiction", "Dark Academia"]),
        Book::new("offline-legends-lattes", "Legends & Lattes")
            .with_authors(["Travis Baldree"])
            .with_published_date("2022-11-08")
            .with_categories(["Fiction", "Fantasy"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_catalog() {
        let source = FixedSource::sample()
            .with_batch(vec![Book::new("x", "Scripted")])
            .with_failure("offline");

        let first = source.fetch_candidates(&CandidateQuery::Popular).await.unwrap();
        assert_eq!(first.len(), 1);

        let second = source.fetch_candidates(&CandidateQuery::Popular).await;
        assert!(matches!(second, Err(SourceError::Unavailable(_))));

        let third = source.fetch_candidates(&CandidateQuery::Popular).await.unwrap();
        assert_eq!(third.len(), sample_catalog().len());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_search_and_category() {
        let source = FixedSource::sample();

        let found = source
            .fetch_candidates(&CandidateQuery::Search("weir".into()))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Project Hail Mary");

        let fantasy = source
            .fetch_candidates(&CandidateQuery::Category("fantasy".into()))
            .await
            .unwrap();
        assert_eq!(fantasy.len(), 2);
    }
}
