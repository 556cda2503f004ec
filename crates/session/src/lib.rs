//! Session crate for the BookSwipe deck.
//!
//! This crate contains the session that ties the swipe core, the item
//! sources and the blurb service together.

pub mod config;
pub mod session;

pub use config::SwipeConfig;
pub use session::{
    CardDetail, DragOverlay, RefillOutcome, RefillTicket, Refiller, SessionUpdate, SwipeSession,
};
