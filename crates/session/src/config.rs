//! Session configuration.

use anyhow::{ensure, Result};
use std::time::Duration;
use swipe::DecisionClassifier;

/// Tunables for a [`crate::SwipeSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeConfig {
    /// Width of the card viewport in pixels
    pub viewport_width: f32,
    /// Fraction of the viewport a drag must exceed to decide
    pub threshold_fraction: f32,
    /// Cards dealt (and blurbed) per refill
    pub batch_size: usize,
    /// Upper bound on one fetch attempt
    pub fetch_timeout: Duration,
    pub retry_attempts: u32,
    /// Delay before the first retry; doubles after each failure
    pub retry_backoff: Duration,
    /// Upper bound on one blurb generation
    pub blurb_timeout: Duration,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            viewport_width: 400.0,
            threshold_fraction: 0.25,
            batch_size: 10,
            fetch_timeout: Duration::from_secs(10),
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(250),
            blurb_timeout: Duration::from_secs(5),
        }
    }
}

impl SwipeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport_width(mut self, width: f32) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn with_threshold_fraction(mut self, fraction: f32) -> Self {
        self.threshold_fraction = fraction;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_backoff = backoff;
        self
    }

    pub fn with_blurb_timeout(mut self, timeout: Duration) -> Self {
        self.blurb_timeout = timeout;
        self
    }

    /// The classifier implied by the viewport settings.
    pub fn classifier(&self) -> Result<DecisionClassifier> {
        Ok(DecisionClassifier::from_viewport(
            self.viewport_width,
            self.threshold_fraction,
        )?)
    }

    /// Reject settings a session cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.classifier()?;
        ensure!(self.batch_size > 0, "batch size must be at least 1");
        ensure!(self.retry_attempts > 0, "retry attempts must be at least 1");
        ensure!(
            !self.fetch_timeout.is_zero(),
            "fetch timeout must be greater than zero"
        );
        ensure!(
            !self.blurb_timeout.is_zero(),
            "blurb timeout must be greater than zero"
        );
        Ok(())
    }
}
