//! Popular mix - several genre searches merged into one deck.
//!
//! ## Algorithm
//! 1. Run each query in [`POPULAR_QUERIES`] for [`PER_QUERY_RESULTS`] books
//! 2. Concatenate in query order
//! 3. Drop repeated ids, keeping the first occurrence
//! 4. Cap at [`POPULAR_LIMIT`]

use catalog::{Book, BookId};
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Genre searches that make up the popular mix
pub const POPULAR_QUERIES: [&str; 5] = [
    "bestseller fiction",
    "bestseller non-fiction",
    "popular romance",
    "popular fantasy",
    "popular mystery",
];

/// Books requested per genre search
pub const PER_QUERY_RESULTS: usize = 4;

/// Upper bound on the merged mix
pub const POPULAR_LIMIT: usize = 20;

/// Merge batches in order, de-duplicating by id and keeping at most `limit`.
pub fn merge_unique<I>(batches: I, limit: usize) -> Vec<Book>
where
    I: IntoIterator<Item = Vec<Book>>,
{
    let mut seen: HashSet<BookId> = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|book| seen.insert(book.id.clone()))
        .take(limit)
        .collect()
}

/// Shuffle a merged mix in place so genres interleave.
pub fn shuffle(books: &mut [Book]) {
    books.shuffle(&mut rand::rng());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: &[&str]) -> Vec<Book> {
        ids.iter().map(|id| Book::new(*id, *id)).collect()
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let merged = merge_unique(vec![batch(&["a", "b"]), batch(&["b", "c", "a"])], 10);
        let ids: Vec<_> = merged.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_respects_limit() {
        let merged = merge_unique(vec![batch(&["a", "b", "c"]), batch(&["d"])], 2);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_shuffle_keeps_members() {
        let mut books = batch(&["a", "b", "c", "d"]);
        shuffle(&mut books);
        let mut ids: Vec<_> = books.iter().map(|b| b.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }
}
