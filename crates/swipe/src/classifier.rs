//! Decision Classifier - maps a released drag to like / pass / undecided.
//!
//! ## Rule
//! ```text
//!   dx < -threshold        -threshold ..= threshold        dx > threshold
//! ◄──────── Pass ────────┤─────────── Undecided ───────────├──────── Like ────────►
//! ```
//! Both boundaries belong to `Undecided`: a drag of exactly `threshold`
//! pixels snaps back. Vertical displacement is ignored.

use crate::error::{Result, SwipeError};
use crate::gesture::Displacement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one released gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Like,
    Pass,
    /// Snap the card back; nothing changes
    Undecided,
}

impl Decision {
    /// True for `Like` and `Pass`, the outcomes that consume a card.
    pub fn is_final(self) -> bool {
        !matches!(self, Decision::Undecided)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Decision::Like => "LIKE",
            Decision::Pass => "PASS",
            Decision::Undecided => "UNDECIDED",
        };
        f.write_str(label)
    }
}

/// Classify a horizontal displacement against a threshold.
///
/// Strict inequality on both sides. A NaN displacement compares false
/// everywhere and therefore yields `Undecided`.
pub fn classify(dx: f32, threshold: f32) -> Decision {
    if dx > threshold {
        Decision::Like
    } else if dx < -threshold {
        Decision::Pass
    } else {
        Decision::Undecided
    }
}

/// Classifier with a validated, fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionClassifier {
    threshold: f32,
}

impl DecisionClassifier {
    /// Create a classifier with an absolute threshold in pixels.
    pub fn new(threshold: f32) -> Result<Self> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(SwipeError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    /// Create a classifier whose threshold is a fraction of the viewport width.
    pub fn from_viewport(width: f32, fraction: f32) -> Result<Self> {
        let valid_width = width.is_finite() && width > 0.0;
        let valid_fraction = fraction.is_finite() && fraction > 0.0 && fraction <= 1.0;
        if !valid_width || !valid_fraction {
            return Err(SwipeError::InvalidViewport { width, fraction });
        }
        Self::new(width * fraction)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn classify(&self, dx: f32) -> Decision {
        classify(dx, self.threshold)
    }

    pub fn classify_displacement(&self, displacement: &Displacement) -> Decision {
        self.classify(displacement.dx)
    }

    /// How far the drag is towards a decision, in `[-1.0, 1.0]`.
    ///
    /// Drives the LIKE / PASS overlay opacity while dragging. Reaching
    /// `±1.0` does not by itself mean a decision: the boundary is exclusive.
    pub fn progress(&self, dx: f32) -> f32 {
        if dx.is_nan() {
            return 0.0;
        }
        (dx / self.threshold).clamp(-1.0, 1.0)
    }
}
