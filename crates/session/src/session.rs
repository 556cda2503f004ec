//! # Swipe Session
//!
//! This module wires the swipe core to the outside world:
//! 1. Pointer and keyboard input go through the gesture tracker and classifier
//! 2. Decisions are applied to the deck; likes land in the match recorder
//! 3. An exhausted deck raises a refill request
//! 4. A refill fetches a batch, blurbs it concurrently and loads it
//!
//! ## Refills
//! A refill is split in three so the fetch can run on another task while the
//! session keeps handling input:
//!
//! ```text
//! begin_refill()  -> RefillTicket { generation, query }   (None if one is in flight)
//! refiller().fetch(&ticket).await                          (no access to the session)
//! finish_refill(ticket, result)                            (loads only if generation matches)
//! ```
//!
//! [`SwipeSession::refill`] runs all three in sequence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use blurb_client::BlurbService;
use catalog::Book;
use sources::{CandidateQuery, ItemSource, RetryingSource};
use swipe::{
    Decision, DecisionClassifier, DecisionEvent, DeckController, DeckListener, DeckStep,
    GestureOutput, GestureSample, GestureTracker, MatchRecorder, PointerEvent,
};

use crate::config::SwipeConfig;

/// Maximum number of categories shown on the back of a card
const DETAIL_CATEGORIES: usize = 3;

// ============================================================================
// Session outputs
// ============================================================================

/// Overlay state while a card is being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOverlay {
    /// What a release right now would decide
    pub tentative: Decision,
    /// LIKE (positive) / PASS (negative) label strength in `[-1.0, 1.0]`
    pub strength: f32,
}

/// What one input did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// No card to act on, or no gesture in flight
    Ignored,
    Pressed,
    Dragging {
        sample: GestureSample,
        overlay: DragOverlay,
    },
    /// Released inside the threshold, or cancelled; the card springs back
    SnappedBack,
    Decided(DecisionEvent),
    /// The last card was decided; a refill is now pending
    Exhausted(DecisionEvent),
}

/// Back of the card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDetail {
    pub title: String,
    pub authors: String,
    pub year: Option<u16>,
    pub page_count: Option<u32>,
    pub categories: Vec<String>,
    pub summary: String,
}

impl CardDetail {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            authors: book.author_line(),
            year: book.published_year,
            page_count: book.page_count,
            categories: book
                .categories
                .iter()
                .take(DETAIL_CATEGORIES)
                .cloned()
                .collect(),
            summary: book.summary().to_string(),
        }
    }
}

/// Permission to load one refill into the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefillTicket {
    pub id: u64,
    /// Deck generation the refill was requested against
    pub generation: u64,
    pub query: CandidateQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillOutcome {
    /// A new deck of this many cards is active
    Loaded(usize),
    /// The source had nothing; the deck stays exhausted
    Empty,
    /// The deck changed while fetching; the batch was dropped
    Stale,
    /// Another refill is already in flight
    Coalesced,
}

// ============================================================================
// Refill plumbing
// ============================================================================

/// Deck listener that raises the refill flag when the deck runs out.
struct RefillSignal(Arc<AtomicBool>);

impl DeckListener for RefillSignal {
    fn on_exhausted(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Fetches and blurbs a batch; cheap to clone into a spawned task.
#[derive(Clone)]
pub struct Refiller {
    source: Arc<RetryingSource<Arc<dyn ItemSource>>>,
    blurbs: BlurbService,
    batch_size: usize,
}

impl Refiller {
    /// Fetch the candidates for `ticket` and blurb the first batch.
    ///
    /// Blurbs are generated concurrently; each one is bounded by the blurb
    /// timeout and falls back on failure, so only the fetch can fail.
    #[instrument(skip(self, ticket), fields(query = %ticket.query, ticket_id = ticket.id))]
    pub async fn fetch(&self, ticket: &RefillTicket) -> Result<Vec<Book>> {
        let mut books = self
            .source
            .fetch_candidates(&ticket.query)
            .await
            .with_context(|| {
                format!("Failed to fetch {} from {}", ticket.query, self.source.name())
            })?;
        books.truncate(self.batch_size);

        let enriched = join_all(books.into_iter().map(|book| self.blurbs.enrich(book))).await;
        debug!("Fetched and blurbed {} books", enriched.len());
        Ok(enriched)
    }
}

// ============================================================================
// Session
// ============================================================================

/// One user's swipe session: a deck, its likes, and where refills come from.
pub struct SwipeSession {
    config: SwipeConfig,
    deck: DeckController,
    tracker: GestureTracker,
    classifier: DecisionClassifier,
    matches: MatchRecorder,
    refiller: Refiller,
    query: CandidateQuery,
    refill_pending: Arc<AtomicBool>,
    in_flight: Option<u64>,
    next_ticket: u64,
    flipped: bool,
}

impl SwipeSession {
    /// Create a session with an empty deck and a pending refill.
    pub fn new(
        source: Arc<dyn ItemSource>,
        blurbs: BlurbService,
        config: SwipeConfig,
    ) -> Result<Self> {
        config.validate().context("Invalid session configuration")?;
        let classifier = config.classifier()?;

        let source = RetryingSource::new(source)
            .with_attempts(config.retry_attempts)
            .with_backoff(config.retry_backoff)
            .with_timeout(config.fetch_timeout);
        let refiller = Refiller {
            source: Arc::new(source),
            blurbs: blurbs.with_timeout(config.blurb_timeout),
            batch_size: config.batch_size,
        };

        let matches = MatchRecorder::new();
        let refill_pending = Arc::new(AtomicBool::new(true));
        let deck = DeckController::new()
            .with_listener(matches.clone())
            .with_listener(RefillSignal(refill_pending.clone()));

        info!(
            "Session ready: threshold {:.0}px, batch size {}",
            classifier.threshold(),
            config.batch_size
        );

        Ok(Self {
            config,
            deck,
            tracker: GestureTracker::new(),
            classifier,
            matches,
            refiller,
            query: CandidateQuery::default(),
            refill_pending,
            in_flight: None,
            next_ticket: 0,
            flipped: false,
        })
    }

    /// Start with `query` instead of the popular mix.
    pub fn with_query(mut self, query: CandidateQuery) -> Self {
        self.query = query;
        self
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Feed one pointer event from the presentation layer.
    pub fn pointer(&mut self, event: PointerEvent) -> SessionUpdate {
        if let PointerEvent::Down(_) = event {
            if self.deck.active().is_none() {
                return SessionUpdate::Ignored;
            }
        }
        if let PointerEvent::Cancel = event {
            if !self.tracker.is_tracking() {
                return SessionUpdate::Ignored;
            }
            self.tracker.cancel();
            return SessionUpdate::SnappedBack;
        }

        match self.tracker.handle(event) {
            None if matches!(event, PointerEvent::Down(_)) => SessionUpdate::Pressed,
            None => SessionUpdate::Ignored,
            Some(GestureOutput::Sample(sample)) => SessionUpdate::Dragging {
                sample,
                overlay: self.overlay(sample.dx),
            },
            Some(GestureOutput::Released(displacement)) => {
                let decision = self.classifier.classify_displacement(&displacement);
                self.apply(decision)
            }
        }
    }

    /// Keyboard swipe: apply `decision` to the active card directly.
    pub fn swipe(&mut self, decision: Decision) -> SessionUpdate {
        if self.deck.is_exhausted() {
            return SessionUpdate::Ignored;
        }
        self.tracker.cancel();
        self.apply(decision)
    }

    /// Overlay state for a horizontal drag of `dx` pixels.
    pub fn overlay(&self, dx: f32) -> DragOverlay {
        DragOverlay {
            tentative: self.classifier.classify(dx),
            strength: self.classifier.progress(dx),
        }
    }

    fn apply(&mut self, decision: Decision) -> SessionUpdate {
        match self.deck.record_decision(decision) {
            Ok(DeckStep::Unchanged) => SessionUpdate::SnappedBack,
            Ok(DeckStep::Advanced(event)) => {
                self.flipped = false;
                SessionUpdate::Decided(event)
            }
            Ok(DeckStep::Exhausted(event)) => {
                self.flipped = false;
                info!("Deck exhausted; refill pending for {}", self.query);
                SessionUpdate::Exhausted(event)
            }
            Err(e) => {
                debug!("Ignoring {}: {}", decision, e);
                SessionUpdate::Ignored
            }
        }
    }

    // ------------------------------------------------------------------------
    // Card state
    // ------------------------------------------------------------------------

    pub fn active(&self) -> Option<&Book> {
        self.deck.active()
    }

    /// One-based position of the active card and the deck size.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.deck.progress()
    }

    /// "i / n", or `None` when nothing is active.
    pub fn progress_label(&self) -> Option<String> {
        self.progress().map(|(i, n)| format!("{} / {}", i, n))
    }

    /// Toggle the active card between front and back.
    ///
    /// Returns the detail view when the card is now showing its back.
    pub fn flip(&mut self) -> Option<CardDetail> {
        let detail = self.deck.active().map(CardDetail::from_book)?;
        self.flipped = !self.flipped;
        self.flipped.then_some(detail)
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn card_detail(&self) -> Option<CardDetail> {
        self.deck.active().map(CardDetail::from_book)
    }

    pub fn matches(&self) -> &MatchRecorder {
        &self.matches
    }

    /// End the session's identity: forget every match.
    pub fn logout(&mut self) {
        let count = self.matches.len();
        self.matches.clear();
        info!("Logged out; cleared {} matches", count);
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    pub fn deck(&self) -> &DeckController {
        &self.deck
    }

    pub fn query(&self) -> &CandidateQuery {
        &self.query
    }

    // ------------------------------------------------------------------------
    // Refills
    // ------------------------------------------------------------------------

    /// Switch to a different query.
    ///
    /// The current deck is dropped, any refill in flight becomes stale and a
    /// new refill is pending.
    pub fn set_query(&mut self, query: CandidateQuery) {
        info!("Switching query to {}", query);
        self.query = query;
        self.tracker.cancel();
        self.flipped = false;
        self.deck.load_items(Vec::new());
        self.in_flight = None;
        self.refill_pending.store(true, Ordering::SeqCst);
    }

    /// True when the deck is exhausted and no batch has replaced it yet.
    pub fn needs_refill(&self) -> bool {
        self.refill_pending.load(Ordering::SeqCst)
    }

    pub fn refill_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Claim the right to refill. `None` while another refill is in flight.
    pub fn begin_refill(&mut self) -> Option<RefillTicket> {
        if let Some(id) = self.in_flight {
            debug!("Refill {} already in flight; coalescing", id);
            return None;
        }
        self.next_ticket += 1;
        let ticket = RefillTicket {
            id: self.next_ticket,
            generation: self.deck.generation(),
            query: self.query.clone(),
        };
        self.in_flight = Some(ticket.id);
        debug!(
            "Refill {} started against generation {}",
            ticket.id, ticket.generation
        );
        Some(ticket)
    }

    /// Handle for running [`Refiller::fetch`] off the session.
    pub fn refiller(&self) -> Refiller {
        self.refiller.clone()
    }

    /// Apply the result of a fetch started with [`Self::begin_refill`].
    ///
    /// # Errors
    /// The fetch error, with context. The deck is left as it was and the
    /// refill stays pending.
    pub fn finish_refill(
        &mut self,
        ticket: RefillTicket,
        result: Result<Vec<Book>>,
    ) -> Result<RefillOutcome> {
        if self.in_flight == Some(ticket.id) {
            self.in_flight = None;
        }

        let books = match result {
            Ok(books) => books,
            Err(e) => {
                warn!("Refill {} failed: {:#}", ticket.id, e);
                return Err(e.context("Could not load more books"));
            }
        };

        if ticket.generation != self.deck.generation() {
            info!(
                "Discarding refill {} for generation {} (deck is at {})",
                ticket.id,
                ticket.generation,
                self.deck.generation()
            );
            return Ok(RefillOutcome::Stale);
        }

        if books.is_empty() {
            warn!("{} returned no books", ticket.query);
            self.refill_pending.store(false, Ordering::SeqCst);
            return Ok(RefillOutcome::Empty);
        }

        let count = books.len();
        if !self.deck.load_if_current(ticket.generation, books) {
            return Ok(RefillOutcome::Stale);
        }
        self.flipped = false;
        self.refill_pending.store(false, Ordering::SeqCst);
        Ok(RefillOutcome::Loaded(count))
    }

    /// Fetch, blurb and load the next batch in one go.
    pub async fn refill(&mut self) -> Result<RefillOutcome> {
        let Some(ticket) = self.begin_refill() else {
            return Ok(RefillOutcome::Coalesced);
        };
        let result = self.refiller.fetch(&ticket).await;
        self.finish_refill(ticket, result)
    }
}

impl std::fmt::Debug for SwipeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipeSession")
            .field("deck", &self.deck)
            .field("query", &self.query)
            .field("matches", &self.matches.len())
            .field("refill_pending", &self.needs_refill())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sources::FixedSource;
    use std::time::Duration;

    fn book(id: &str) -> Book {
        Book::new(id, id.to_uppercase())
    }

    fn session(source: FixedSource) -> SwipeSession {
        let config = SwipeConfig::default().with_retry(1, Duration::from_millis(1));
        SwipeSession::new(Arc::new(source), BlurbService::offline(), config).unwrap()
    }

    #[test]
    fn test_card_detail_limits_categories() {
        let book = Book::new("x", "X")
            .with_categories(["a", "b", "c", "d"])
            .with_page_count(120);
        let detail = CardDetail::from_book(&book);
        assert_eq!(detail.categories, vec!["a", "b", "c"]);
        assert_eq!(detail.page_count, Some(120));
        assert_eq!(detail.summary, "No description available.");
    }

    #[test]
    fn test_begin_refill_coalesces() {
        let mut session = session(FixedSource::default());
        let first = session.begin_refill();
        assert!(first.is_some());
        assert!(session.begin_refill().is_none());
        assert!(session.refill_in_flight());
    }

    #[tokio::test]
    async fn test_flip_toggles_and_resets_on_decision() {
        let mut session = session(FixedSource::new(vec![book("a"), book("b")]));
        session.refill().await.unwrap();

        assert!(session.flip().is_some());
        assert!(session.is_flipped());
        assert!(session.flip().is_none());
        assert!(!session.is_flipped());

        session.flip();
        session.swipe(Decision::Pass);
        assert!(!session.is_flipped());
    }

    #[tokio::test]
    async fn test_failed_refill_keeps_state() {
        let mut session = session(FixedSource::default().with_failure("offline"));
        let result = session.refill().await;

        assert!(result.is_err());
        assert!(session.needs_refill());
        assert!(!session.refill_in_flight());
        assert!(session.active().is_none());
    }
}
