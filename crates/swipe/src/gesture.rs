//! Gesture Tracker - turns pointer events into drag offsets.
//!
//! One press-drag-release interaction is one gesture:
//!
//! ```text
//! Down(p0) ──► Move(p1) ──► Move(p2) ──► ... ──► Up(pn)
//!              Sample      Sample                Released { dx, dy }
//! ```
//!
//! Every offset is measured from the press point. The tracker only measures:
//! it never touches the deck or the match list, and it keeps nothing beyond
//! the gesture currently in flight.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// A pointer location with the time it was observed.
///
/// `at` is measured from any fixed origin chosen by the caller (for example
/// the first event of the session); only differences are used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
    pub at: Duration,
}

impl PointerPosition {
    pub fn new(x: f32, y: f32, at: Duration) -> Self {
        Self { x, y, at }
    }
}

/// Raw input forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(PointerPosition),
    Move(PointerPosition),
    Up(PointerPosition),
    /// The platform took the pointer away (scroll, system gesture, ...)
    Cancel,
}

/// Instantaneous drag state while the pointer is down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureSample {
    /// Horizontal offset from the press point, in pixels
    pub dx: f32,
    /// Vertical offset from the press point, in pixels
    pub dy: f32,
    /// Time since the press
    pub elapsed: Duration,
    /// Horizontal velocity estimate in pixels per second
    pub velocity_x: f32,
    /// Vertical velocity estimate in pixels per second
    pub velocity_y: f32,
}

/// Terminal displacement, emitted exactly once per gesture on release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    pub dx: f32,
    pub dy: f32,
}

/// What the tracker produced for one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutput {
    Sample(GestureSample),
    Released(Displacement),
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    origin: PointerPosition,
    last: PointerPosition,
    velocity: (f32, f32),
}

impl InFlight {
    fn sample(&mut self, pos: PointerPosition) -> GestureSample {
        let dt = pos.at.saturating_sub(self.last.at).as_secs_f32();
        if dt > 0.0 {
            self.velocity = ((pos.x - self.last.x) / dt, (pos.y - self.last.y) / dt);
        }
        self.last = pos;
        GestureSample {
            dx: pos.x - self.origin.x,
            dy: pos.y - self.origin.y,
            elapsed: pos.at.saturating_sub(self.origin.at),
            velocity_x: self.velocity.0,
            velocity_y: self.velocity.1,
        }
    }
}

/// Measures the gesture currently in flight, if any.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    in_flight: Option<InFlight>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True between a press and its release or cancel.
    pub fn is_tracking(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Feed one pointer event.
    ///
    /// Returns a sample for moves, the terminal displacement for a release,
    /// and `None` for presses, cancels, and any move or release that arrives
    /// while no gesture is in flight.
    pub fn handle(&mut self, event: PointerEvent) -> Option<GestureOutput> {
        match event {
            PointerEvent::Down(pos) => {
                self.press(pos);
                None
            }
            PointerEvent::Move(pos) => self.drag(pos).map(GestureOutput::Sample),
            PointerEvent::Up(pos) => self.release(pos).map(GestureOutput::Released),
            PointerEvent::Cancel => {
                self.cancel();
                None
            }
        }
    }

    /// Start a new gesture. Any gesture already in flight is dropped.
    pub fn press(&mut self, pos: PointerPosition) {
        if self.in_flight.is_some() {
            trace!("Press while tracking; starting a fresh gesture");
        }
        self.in_flight = Some(InFlight {
            origin: pos,
            last: pos,
            velocity: (0.0, 0.0),
        });
    }

    /// Record a move of the active pointer.
    pub fn drag(&mut self, pos: PointerPosition) -> Option<GestureSample> {
        self.in_flight.as_mut().map(|gesture| gesture.sample(pos))
    }

    /// Finish the gesture and emit its displacement from the press point.
    pub fn release(&mut self, pos: PointerPosition) -> Option<Displacement> {
        let gesture = self.in_flight.take()?;
        let displacement = Displacement {
            dx: pos.x - gesture.origin.x,
            dy: pos.y - gesture.origin.y,
        };
        trace!(dx = displacement.dx, dy = displacement.dy, "Gesture released");
        Some(displacement)
    }

    /// Abandon the gesture without emitting a displacement.
    pub fn cancel(&mut self) {
        self.in_flight = None;
    }
}
