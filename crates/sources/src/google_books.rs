//! Google Books Source - candidates from the public volumes search.
//!
//! ## Request
//! `GET {base}/volumes?q={terms}&maxResults={n}&langRestrict=en`
//!
//! No API key is needed for volume search. Decoding the body into books
//! (see `catalog::parser`) happens on the blocking pool so a large response
//! never stalls the runtime.

use crate::error::{Result, SourceError};
use crate::popular::{self, PER_QUERY_RESULTS, POPULAR_LIMIT, POPULAR_QUERIES};
use crate::traits::{CandidateQuery, ItemSource};
use async_trait::async_trait;
use catalog::Book;
use futures::future::join_all;
use reqwest::{IntoUrl, Url};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// The public Google Books API
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1/";

/// Books requested for a plain search
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// The API rejects larger pages
const MAX_RESULTS_CAP: usize = 40;

const USER_AGENT: &str = concat!("bookswipe/", env!("CARGO_PKG_VERSION"));

/// Item source backed by the Google Books volumes search
#[derive(Debug, Clone)]
pub struct GoogleBooksSource {
    base_url: Url,
    client: reqwest::Client,
    max_results: usize,
    lang_restrict: Option<String>,
    shuffle_popular: bool,
}

impl GoogleBooksSource {
    /// Create a source for the public API with a 10 second request timeout.
    pub fn new() -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            client: build_client(Duration::from_secs(10))?,
            max_results: DEFAULT_MAX_RESULTS,
            lang_restrict: Some("en".to_string()),
            shuffle_popular: false,
        })
    }

    /// Use a different API root (a proxy, or a local stub).
    pub fn with_base_url<T: IntoUrl>(mut self, url: T) -> Result<Self> {
        let mut url = url.into_url()?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    /// Per-request timeout for the underlying HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    /// Books requested per search (clamped to 1..=40).
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, MAX_RESULTS_CAP);
        self
    }

    /// Restrict results to one language, or `None` for any.
    pub fn with_lang_restrict(mut self, lang: Option<String>) -> Self {
        self.lang_restrict = lang;
        self
    }

    /// Shuffle the popular mix after merging.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle_popular = shuffle;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the search URL for `terms`.
    pub fn volumes_url(&self, terms: &str, max_results: usize) -> Result<Url> {
        let mut url = self.base_url.join("volumes")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", terms)
                .append_pair("maxResults", &max_results.clamp(1, MAX_RESULTS_CAP).to_string());
            if let Some(lang) = &self.lang_restrict {
                pairs.append_pair("langRestrict", lang);
            }
        }
        Ok(url)
    }

    /// Run one search.
    #[instrument(skip(self))]
    pub async fn search(&self, terms: &str, max_results: usize) -> Result<Vec<Book>> {
        let url = self.volumes_url(terms, max_results)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;

        let books = tokio::task::spawn_blocking(move || catalog::parse_volumes(&body))
            .await
            .map_err(|e| SourceError::Task(e.to_string()))??;
        debug!("Search returned {} books", books.len());
        Ok(books)
    }

    /// The popular mix: several genre searches run concurrently, then merged
    /// and de-duplicated in query order.
    ///
    /// A failing genre search is skipped. Only when every search fails is
    /// the last error returned.
    #[instrument(skip(self))]
    pub async fn popular(&self) -> Result<Vec<Book>> {
        let results = join_all(
            POPULAR_QUERIES
                .iter()
                .map(|terms| self.search(terms, PER_QUERY_RESULTS)),
        )
        .await;

        let mut batches = Vec::with_capacity(POPULAR_QUERIES.len());
        let mut last_error = None;
        for (terms, result) in POPULAR_QUERIES.iter().zip(results) {
            match result {
                Ok(books) => batches.push(books),
                Err(e) => {
                    warn!("Popular query '{}' failed: {}", terms, e);
                    last_error = Some(e);
                }
            }
        }

        if batches.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        let mut books = popular::merge_unique(batches, POPULAR_LIMIT);
        if self.shuffle_popular {
            popular::shuffle(&mut books);
        }
        Ok(books)
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

#[async_trait]
impl ItemSource for GoogleBooksSource {
    fn name(&self) -> &str {
        "GoogleBooks"
    }

    async fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Book>> {
        match query.search_terms() {
            None => self.popular().await,
            Some(terms) => self.search(&terms, self.max_results).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    /// Serve `respond(request_target) -> (status, body)` on a local port.
    ///
    /// Returns the API root to point a source at.
    async fn stub_server<F>(respond: F) -> String
    where
        F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let respond = Arc::new(respond);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let respond = respond.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let request = String::from_utf8_lossy(&request);
                    let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                    let (status, body) = respond(&target);
                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}/books/v1/", addr)
    }

    fn query_of(target: &str) -> String {
        target
            .split("q=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap_or_default()
            .to_string()
    }

    fn volumes(ids: &[&str]) -> String {
        let items: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"{{"id": "{id}", "volumeInfo": {{"title": "Title {id}"}}}}"#))
            .collect();
        format!(r#"{{"items": [{}]}}"#, items.join(", "))
    }

    /// Every genre query answers "shared" plus a book of its own, except
    /// the mystery query, which is down.
    async fn genre_server() -> String {
        stub_server(|target| {
            let query = query_of(target);
            if query == "popular+mystery" {
                (503, r#"{"error": "backend unavailable"}"#.to_string())
            } else {
                (200, volumes(&["shared", &query]))
            }
        })
        .await
    }

    fn source_at(base: &str) -> GoogleBooksSource {
        GoogleBooksSource::new()
            .unwrap()
            .with_base_url(base)
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_volumes_url() {
        let source = GoogleBooksSource::new().unwrap();
        let url = source.volumes_url("bestseller fiction", 4).unwrap();
        assert_eq!(url.host_str(), Some("www.googleapis.com"));
        assert_eq!(url.path(), "/books/v1/volumes");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "bestseller fiction".to_string()),
                ("maxResults".to_string(), "4".to_string()),
                ("langRestrict".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let source = GoogleBooksSource::new()
            .unwrap()
            .with_base_url("http://localhost:8080/books/v1")
            .unwrap()
            .with_lang_restrict(None);
        let url = source.volumes_url("dune", 100).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/books/v1/volumes?q=dune&maxResults=40");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let source = GoogleBooksSource::new()
            .unwrap()
            .with_base_url("http://127.0.0.1:9/")
            .unwrap()
            .with_timeout(Duration::from_millis(500))
            .unwrap();
        let result = source
            .fetch_candidates(&CandidateQuery::Search("dune".into()))
            .await;
        assert!(matches!(result, Err(SourceError::Http(_))));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let source = source_at(&genre_server().await);
        let result = source
            .fetch_candidates(&CandidateQuery::Search("popular mystery".into()))
            .await;
        assert!(matches!(result, Err(SourceError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_search_decodes_volumes() {
        let source = source_at(&genre_server().await);
        let books = source
            .fetch_candidates(&CandidateQuery::Category("Fantasy".into()))
            .await
            .unwrap();
        let ids: Vec<_> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["shared", "subject%3AFantasy"]);
        assert_eq!(books[0].primary_author(), catalog::UNKNOWN_AUTHOR);
    }

    #[tokio::test]
    async fn test_popular_skips_failed_genre() {
        let source = source_at(&genre_server().await);
        let books = source.fetch_candidates(&CandidateQuery::Popular).await.unwrap();

        let ids: Vec<_> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "shared",
                "bestseller+fiction",
                "bestseller+non-fiction",
                "popular+romance",
                "popular+fantasy",
            ]
        );
    }

    #[tokio::test]
    async fn test_popular_fails_when_every_genre_fails() {
        let source = GoogleBooksSource::new()
            .unwrap()
            .with_base_url("http://127.0.0.1:9/")
            .unwrap()
            .with_timeout(Duration::from_millis(500))
            .unwrap();
        let result = source.fetch_candidates(&CandidateQuery::Popular).await;
        assert!(result.is_err());
    }
}
