//! Blurb Service - generated text with a local fallback.
//!
//! Callers always get a non-empty blurb back. A generator failure, timeout,
//! or missing key is logged and answered with [`fallback_blurb`].

use crate::fallback::fallback_blurb;
use crate::groq::{GroqClient, API_KEY_ENV};
use crate::{BlurbError, BlurbGenerator, BlurbRequest, Result};
use catalog::Book;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct BlurbService {
    generator: Option<Arc<dyn BlurbGenerator>>,
    timeout: Duration,
}

impl BlurbService {
    pub fn new(generator: Arc<dyn BlurbGenerator>) -> Self {
        Self {
            generator: Some(generator),
            timeout: Duration::from_secs(5),
        }
    }

    /// A service that only ever produces fallback blurbs.
    pub fn offline() -> Self {
        Self {
            generator: None,
            timeout: Duration::from_secs(5),
        }
    }

    /// Use Groq when `GROQ_API_KEY` is set, otherwise run offline.
    ///
    /// An unusable key is logged and treated like a missing one.
    pub fn from_env() -> Self {
        Self::from_env_var(API_KEY_ENV)
    }

    fn from_env_var(name: &str) -> Self {
        match GroqClient::from_env_var(name) {
            Ok(Some(client)) => {
                info!("Generated blurbs enabled ({})", client.model());
                Self::new(Arc::new(client))
            }
            Ok(None) => Self::offline(),
            Err(e) => {
                warn!("Generated blurbs disabled: {}", e);
                Self::offline()
            }
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a generator is configured at all.
    pub fn is_generating(&self) -> bool {
        self.generator.is_some()
    }

    /// Ask the generator, without falling back.
    pub async fn try_generate(&self, request: &BlurbRequest) -> Result<String> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| BlurbError::MissingApiKey(API_KEY_ENV.to_string()))?;

        match tokio::time::timeout(self.timeout, generator.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(BlurbError::Timeout(self.timeout)),
        }
    }

    /// A blurb for `request`; never empty, never an error.
    pub async fn blurb(&self, request: &BlurbRequest) -> String {
        if self.generator.is_none() {
            return request.fallback();
        }

        match self.try_generate(request).await {
            Ok(text) => {
                debug!("Generated blurb for '{}'", request.title);
                text
            }
            Err(e) => {
                warn!("Blurb for '{}' fell back: {}", request.title, e);
                request.fallback()
            }
        }
    }

    /// Attach a blurb to `book` unless it already has one.
    pub async fn enrich(&self, book: Book) -> Book {
        if book.blurb.is_some() {
            return book;
        }
        let blurb = self.blurb(&BlurbRequest::from_book(&book)).await;
        book.with_blurb(blurb)
    }
}

impl Default for BlurbService {
    fn default() -> Self {
        Self::offline()
    }
}

impl std::fmt::Debug for BlurbService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlurbService")
            .field("generator", &self.generator.as_ref().map(|g| g.name()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BlurbRequest {
    fn fallback(&self) -> String {
        fallback_blurb(&self.title, &self.author, self.description.as_deref())
    }
}
