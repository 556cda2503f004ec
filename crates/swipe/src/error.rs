//! Error types for the swipe core.

use thiserror::Error;

/// Errors raised by the swipe core.
///
/// `EmptyDeck` is a caller bug: check [`crate::DeckController::is_exhausted`]
/// before recording a decision. The other variants are configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwipeError {
    /// A decision was recorded while no item was active
    #[error("No active item: cannot record a decision on an empty deck")]
    EmptyDeck,

    /// Threshold must be a positive, finite number of pixels
    #[error("Invalid swipe threshold: {0}")]
    InvalidThreshold(f32),

    /// Viewport width must be positive and the fraction in (0, 1]
    #[error("Invalid viewport: width {width}, fraction {fraction}")]
    InvalidViewport { width: f32, fraction: f32 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SwipeError>;
