//! Retrying Source - timeout and exponential backoff around another source.
//!
//! ## Algorithm
//! For each attempt up to `attempts`:
//! 1. Run the inner fetch under `timeout`
//! 2. On success, return
//! 3. On a non-retryable error, return it immediately
//! 4. Otherwise sleep `backoff * 2^(attempt - 1)` and go again
//!
//! The last error is returned when every attempt fails.

use crate::error::{Result, SourceError};
use crate::traits::{CandidateQuery, ItemSource};
use async_trait::async_trait;
use catalog::Book;
use std::time::Duration;
use tracing::{debug, warn};

/// Wraps any [`ItemSource`] with a timeout and retries
#[derive(Debug, Clone)]
pub struct RetryingSource<S> {
    inner: S,
    attempts: u32,
    backoff: Duration,
    timeout: Duration,
}

impl<S: ItemSource> RetryingSource<S> {
    /// Wrap `inner` with 3 attempts, 250ms initial backoff, 10s timeout.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            attempts: 3,
            backoff: Duration::from_millis(250),
            timeout: Duration::from_secs(10),
        }
    }

    /// Total attempts including the first (minimum 1).
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Delay before the second attempt; doubles each time after.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Upper bound on each individual attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

#[async_trait]
impl<S: ItemSource> ItemSource for RetryingSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Book>> {
        let mut attempt = 1;
        loop {
            let result = tokio::time::timeout(self.timeout, self.inner.fetch_candidates(query))
                .await
                .unwrap_or(Err(SourceError::Timeout(self.timeout)));

            let error = match result {
                Ok(books) => {
                    debug!(
                        "{} answered {} on attempt {}",
                        self.inner.name(),
                        query,
                        attempt
                    );
                    return Ok(books);
                }
                Err(e) => e,
            };

            if !error.is_retryable() || attempt >= self.attempts {
                warn!(
                    "{} failed for {} after {} attempt(s): {}",
                    self.inner.name(),
                    query,
                    attempt,
                    error
                );
                return Err(error);
            }

            let delay = self.delay_after(attempt);
            warn!(
                "{} attempt {} for {} failed ({}); retrying in {:?}",
                self.inner.name(),
                attempt,
                query,
                error,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FixedSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Never answers in time
    #[derive(Default)]
    struct Hanging {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ItemSource for Hanging {
        fn name(&self) -> &str {
            "Hanging"
        }

        async fn fetch_candidates(&self, _query: &CandidateQuery) -> Result<Vec<Book>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    /// Always answers with one HTTP status
    struct Rejecting {
        status: u16,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ItemSource for Rejecting {
        fn name(&self) -> &str {
            "Rejecting"
        }

        async fn fetch_candidates(&self, _query: &CandidateQuery) -> Result<Vec<Book>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Status {
                status: self.status,
                url: "http://books.test/volumes".to_string(),
            })
        }
    }

    fn fast(source: FixedSource) -> RetryingSource<FixedSource> {
        RetryingSource::new(source)
            .with_attempts(3)
            .with_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let source = fast(
            FixedSource::new(Vec::new())
                .with_failure("blip")
                .with_failure("blip")
                .with_batch(vec![Book::new("a", "A")]),
        );
        let books = source.fetch_candidates(&CandidateQuery::Popular).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(source.inner().calls(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_attempts() {
        let source = fast(
            FixedSource::new(Vec::new())
                .with_failure("down")
                .with_failure("down")
                .with_failure("down")
                .with_batch(vec![Book::new("late", "Too late")]),
        );
        let result = source.fetch_candidates(&CandidateQuery::Popular).await;
        assert!(matches!(result, Err(SourceError::Unavailable(_))));
        assert_eq!(source.inner().calls(), 3);
    }

    #[tokio::test]
    async fn test_each_attempt_is_timed_out() {
        let source = RetryingSource::new(Hanging::default())
            .with_attempts(2)
            .with_backoff(Duration::from_millis(1))
            .with_timeout(Duration::from_millis(20));

        let result = source.fetch_candidates(&CandidateQuery::Popular).await;
        assert!(matches!(result, Err(SourceError::Timeout(t)) if t == Duration::from_millis(20)));
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let source = RetryingSource::new(Rejecting {
            status: 404,
            calls: AtomicUsize::new(0),
        })
        .with_attempts(3)
        .with_backoff(Duration::from_millis(1));

        let result = source.fetch_candidates(&CandidateQuery::Popular).await;
        assert!(matches!(result, Err(SourceError::Status { status: 404, .. })));
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let source = RetryingSource::new(Rejecting {
            status: 503,
            calls: AtomicUsize::new(0),
        })
        .with_attempts(3)
        .with_backoff(Duration::from_millis(1));

        let result = source.fetch_candidates(&CandidateQuery::Popular).await;
        assert!(matches!(result, Err(SourceError::Status { status: 503, .. })));
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_backoff_doubles() {
        let source = RetryingSource::new(FixedSource::default())
            .with_backoff(Duration::from_millis(100));
        assert_eq!(source.delay_after(1), Duration::from_millis(100));
        assert_eq!(source.delay_after(2), Duration::from_millis(200));
        assert_eq!(source.delay_after(3), Duration::from_millis(400));
    }
}
