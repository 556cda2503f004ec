//! Match Recorder - the liked-books list for the current session.
//!
//! A `MatchRecorder` is a cheap handle: clones share the same list. Hand one
//! clone to the deck as a listener and keep another for whatever screen
//! shows matches. Screens that want live updates call
//! [`MatchRecorder::subscribe`] instead of re-reading the list on a timer.
//!
//! Nothing is persisted; the list lives as long as the last handle.

use crate::classifier::Decision;
use crate::deck::{DecisionEvent, DeckListener};
use catalog::{Book, BookId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Buffered notifications per subscriber before the oldest are dropped
const EVENT_CAPACITY: usize = 64;

/// A liked book and when it was liked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub book: Book,
    pub matched_at: DateTime<Utc>,
}

/// Change notifications published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    Recorded(MatchRecord),
    Cleared,
}

#[derive(Debug, Default)]
struct MatchList {
    records: Vec<MatchRecord>,
    ids: HashSet<BookId>,
}

/// Deduplicated, insertion-ordered collection of matches.
#[derive(Debug, Clone)]
pub struct MatchRecorder {
    inner: Arc<RwLock<MatchList>>,
    events: broadcast::Sender<MatchEvent>,
}

impl MatchRecorder {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(MatchList::default())),
            events,
        }
    }

    /// Record a like at the current time.
    ///
    /// Returns `true` if the book was new, `false` if it was already matched.
    pub fn record(&self, book: Book) -> bool {
        self.record_at(book, Utc::now())
    }

    /// Record a like with an explicit timestamp.
    pub fn record_at(&self, book: Book, matched_at: DateTime<Utc>) -> bool {
        let record = {
            let mut list = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            if !list.ids.insert(book.id.clone()) {
                debug!(book_id = %book.id, "Already matched");
                return false;
            }
            let record = MatchRecord { book, matched_at };
            list.records.push(record.clone());
            record
        };
        info!("Matched '{}'", record.book.title);
        self.publish(MatchEvent::Recorded(record));
        true
    }

    /// Snapshot of all matches in the order they were first recorded.
    pub fn list(&self) -> Vec<MatchRecord> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ids
            .contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every match (logout / session reset).
    pub fn clear(&self) {
        {
            let mut list = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            list.records.clear();
            list.ids.clear();
        }
        info!("Cleared matches");
        self.publish(MatchEvent::Cleared);
    }

    /// Receive every change made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: MatchEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Default for MatchRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Likes flowing out of the deck become matches.
impl DeckListener for MatchRecorder {
    fn on_decision(&mut self, event: &DecisionEvent) {
        if event.decision == Decision::Like {
            self.record(event.item.clone());
        }
    }
}
