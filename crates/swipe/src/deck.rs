//! Deck Controller - owns the card stack and sequences decisions.
//!
//! ## Lifecycle
//! ```text
//! load_items([A, B, C])      cursor = 0, active = A
//! record_decision(Like)      A discarded, active = B   -> on_decision(A, Like)
//! record_decision(Undecided) nothing happens
//! record_decision(Pass)      B discarded, active = C   -> on_decision(B, Pass)
//! record_decision(Like)      C discarded, exhausted    -> on_decision(C, Like), on_exhausted()
//! ```
//!
//! The controller never fetches anything. Exhaustion is a signal; whoever
//! listens decides whether and how to refill, and eventually calls
//! [`DeckController::load_items`] (or [`DeckController::load_if_current`]).

use crate::classifier::Decision;
use crate::error::{Result, SwipeError};
use catalog::{Book, BookId};
use std::fmt;
use tracing::{debug, info};

/// Emitted whenever a card leaves the deck.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionEvent {
    pub item_id: BookId,
    pub decision: Decision,
    /// The discarded card, so listeners can record it without a lookup
    pub item: Book,
    /// Zero-based position of the card in the deck it was dealt from
    pub position: usize,
}

/// Result of [`DeckController::record_decision`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeckStep {
    /// `Undecided`: the active card stays active
    Unchanged,
    /// A card was discarded and another one is now active
    Advanced(DecisionEvent),
    /// The last card was discarded; the exhaustion signal has fired
    Exhausted(DecisionEvent),
}

impl DeckStep {
    pub fn event(&self) -> Option<&DecisionEvent> {
        match self {
            DeckStep::Unchanged => None,
            DeckStep::Advanced(event) | DeckStep::Exhausted(event) => Some(event),
        }
    }
}

/// Side-effect hooks invoked synchronously by the controller.
///
/// ## Design Note
/// - Both hooks have empty defaults; implement only what you need
/// - `Send` lets a controller move to another thread as a whole, but calls are
///   always made from whichever thread owns the controller
pub trait DeckListener: Send {
    /// A card was discarded with `Like` or `Pass`.
    fn on_decision(&mut self, _event: &DecisionEvent) {}

    /// The deck ran out. Fired once per exhaustion.
    fn on_exhausted(&mut self) {}
}

/// Owns the ordered stack of candidates and the cursor into it.
pub struct DeckController {
    items: Vec<Book>,
    cursor: usize,
    /// Set once `on_exhausted` has fired for the current deck
    exhaustion_signalled: bool,
    /// Bumped on every load; lets async refills detect that they are stale
    generation: u64,
    listeners: Vec<Box<dyn DeckListener>>,
}

impl DeckController {
    /// Create an empty deck.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            exhaustion_signalled: false,
            generation: 0,
            listeners: Vec::new(),
        }
    }

    /// Add a listener (builder pattern).
    pub fn with_listener(mut self, listener: impl DeckListener + 'static) -> Self {
        self.add_listener(listener);
        self
    }

    pub fn add_listener(&mut self, listener: impl DeckListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the deck and reset the cursor.
    ///
    /// Whatever was left of the previous deck is dropped; loads never merge.
    /// An empty `items` leaves the deck exhausted without firing
    /// `on_exhausted` (that signal is reserved for running out by deciding).
    ///
    /// Returns the new deck generation.
    pub fn load_items(&mut self, items: Vec<Book>) -> u64 {
        let discarded = self.remaining();
        if discarded > 0 {
            debug!("Reload discards {} undecided cards", discarded);
        }
        self.items = items;
        self.cursor = 0;
        self.exhaustion_signalled = false;
        self.generation += 1;
        info!(
            "Loaded deck generation {} with {} cards",
            self.generation,
            self.items.len()
        );
        self.generation
    }

    /// Load `items` only if no other load happened since `generation` was read.
    ///
    /// Returns `false` and leaves the deck alone when the caller is stale.
    pub fn load_if_current(&mut self, generation: u64, items: Vec<Book>) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping stale load for generation {} (current {})",
                generation, self.generation
            );
            return false;
        }
        self.load_items(items);
        true
    }

    /// Apply a decision to the active card.
    ///
    /// # Errors
    /// [`SwipeError::EmptyDeck`] when there is no active card, whatever the
    /// decision. Nothing is mutated in that case.
    pub fn record_decision(&mut self, decision: Decision) -> Result<DeckStep> {
        let position = self.cursor;
        let item = self.items.get(position).ok_or(SwipeError::EmptyDeck)?.clone();

        if !decision.is_final() {
            return Ok(DeckStep::Unchanged);
        }

        self.cursor += 1;
        let event = DecisionEvent {
            item_id: item.id.clone(),
            decision,
            item,
            position,
        };
        debug!(item_id = %event.item_id, %decision, "Card decided");

        for listener in &mut self.listeners {
            listener.on_decision(&event);
        }

        if self.is_exhausted() && !self.exhaustion_signalled {
            self.exhaustion_signalled = true;
            info!("Deck generation {} exhausted", self.generation);
            for listener in &mut self.listeners {
                listener.on_exhausted();
            }
            return Ok(DeckStep::Exhausted(event));
        }
        Ok(DeckStep::Advanced(event))
    }

    /// True when no card is active: never loaded, loaded empty, or decided through.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }

    /// The card eligible for a decision.
    pub fn active(&self) -> Option<&Book> {
        self.items.get(self.cursor)
    }

    /// Cards still waiting, starting with the active one.
    pub fn upcoming(&self) -> &[Book] {
        self.items.get(self.cursor..).unwrap_or(&[])
    }

    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.cursor)
    }

    /// Size of the deck as loaded, decided cards included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// One-based position of the active card and the deck size ("2 / 10").
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.active().map(|_| (self.cursor + 1, self.items.len()))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for DeckController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeckController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckController")
            .field("len", &self.items.len())
            .field("cursor", &self.cursor)
            .field("generation", &self.generation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
