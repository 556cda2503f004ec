//! Swipe core: gesture in, decision out, deck advanced, likes recorded.
//!
//! This crate provides:
//! - GestureTracker for measuring a press-drag-release interaction
//! - DecisionClassifier for turning the release into Like / Pass / Undecided
//! - DeckController for the card stack and its side-effect hooks
//! - MatchRecorder for the session's liked books
//!
//! ## Architecture
//! Everything here is synchronous and never blocks. Events flow in one
//! direction:
//! 1. Pointer events go to the tracker, which emits samples and one release
//! 2. The classifier turns the release into a decision
//! 3. The deck applies the decision and calls its listeners
//! 4. The match recorder (a listener) keeps the likes
//!
//! Refilling an exhausted deck is somebody else's job; the deck only signals.
//!
//! ## Example Usage
//! ```ignore
//! use swipe::{DeckController, DecisionClassifier, GestureTracker, MatchRecorder};
//!
//! let matches = MatchRecorder::new();
//! let mut deck = DeckController::new().with_listener(matches.clone());
//! let classifier = DecisionClassifier::from_viewport(400.0, 0.25)?;
//! let mut tracker = GestureTracker::new();
//!
//! deck.load_items(books);
//! tracker.press(start);
//! if let Some(released) = tracker.release(end) {
//!     if !deck.is_exhausted() {
//!         deck.record_decision(classifier.classify_displacement(&released))?;
//!     }
//! }
//! ```

pub mod classifier;
pub mod deck;
pub mod error;
pub mod gesture;
pub mod matches;

// Re-export main types
pub use classifier::{classify, Decision, DecisionClassifier};
pub use deck::{DeckController, DeckListener, DeckStep, DecisionEvent};
pub use error::{Result, SwipeError};
pub use gesture::{
    Displacement, GestureOutput, GestureSample, GestureTracker, PointerEvent, PointerPosition,
};
pub use matches::{MatchEvent, MatchRecord, MatchRecorder};
