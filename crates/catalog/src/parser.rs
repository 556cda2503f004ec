//! Adapter for the Google Books `volumes` response shape.
//!
//! Everything that knows what the external API returns lives here. The rest
//! of the workspace only ever sees [`Book`].
//!
//! ```text
//! { "items": [ { "id": "...", "volumeInfo": { "title": "...", "authors": [...],
//!                "imageLinks": { "thumbnail": "..." }, "publishedDate": "...",
//!                "pageCount": 123, "categories": [...] } } ] }
//! ```
//!
//! Missing data is normalized, not reported:
//! - no authors -> `["Unknown Author"]`
//! - no title -> `"Untitled"`
//! - no usable image link -> `cover_url: None`

use crate::error::{CatalogError, Result};
use crate::types::{Book, UNTITLED};
use rayon::prelude::*;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

// =============================================================================
// Wire shapes
// =============================================================================

/// Top-level `GET /volumes` response
#[derive(Debug, Default, Deserialize)]
pub struct VolumesResponse {
    /// Absent when the search has no hits
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub image_links: Option<ImageLinks>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<u32>,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub extra_large: Option<String>,
}

impl ImageLinks {
    /// Largest image available, before any rewriting.
    fn best(&self) -> Option<&str> {
        [
            &self.extra_large,
            &self.large,
            &self.medium,
            &self.small,
            &self.thumbnail,
            &self.small_thumbnail,
        ]
        .into_iter()
        .filter_map(|link| link.as_deref())
        .find(|link| !link.trim().is_empty())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Decode a raw `volumes` response body into books.
///
/// Volumes without an id are skipped with a warning; the rest of the batch is
/// still returned.
pub fn parse_volumes(body: &str) -> Result<Vec<Book>> {
    let response: VolumesResponse = serde_json::from_str(body)?;
    Ok(books_from_response(response))
}

/// Normalize an already-decoded response.
///
/// Normalization is independent per volume, so it runs on the rayon pool.
/// Output order matches input order.
pub fn books_from_response(response: VolumesResponse) -> Vec<Book> {
    let total = response.items.len();
    let books: Vec<Book> = response
        .items
        .into_par_iter()
        .enumerate()
        .filter_map(|(index, volume)| match normalize_volume(index, volume) {
            Ok(book) => Some(book),
            Err(e) => {
                warn!("Skipping volume: {}", e);
                None
            }
        })
        .collect();
    debug!("Normalized {} of {} volumes", books.len(), total);
    books
}

/// Convert one volume into a [`Book`], filling in defaults.
pub fn normalize_volume(index: usize, volume: Volume) -> Result<Book> {
    if volume.id.trim().is_empty() {
        return Err(CatalogError::MissingId { index });
    }
    let info = volume.volume_info;

    let title = info
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let mut book = Book::new(volume.id, title).with_authors(info.authors.unwrap_or_default());

    if let Some(url) = info.image_links.as_ref().and_then(ImageLinks::best) {
        book = book.with_cover_url(enhance_cover_url(url));
    }
    if let Some(description) = info.description.filter(|d| !d.trim().is_empty()) {
        book = book.with_description(description);
    }
    if let Some(date) = info.published_date {
        book = book.with_published_date(date);
    }
    if let Some(pages) = info.page_count {
        book = book.with_page_count(pages);
    }
    if let Some(categories) = info.categories {
        book = book.with_categories(categories);
    }
    Ok(book)
}

// =============================================================================
// Cover images
// =============================================================================

static ZOOM_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&zoom=\d+").expect("static regex"));
static EDGE_CURL_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&edge=curl").expect("static regex"));
static SIZE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sz=(thumbnail|small|medium)").expect("static regex"));

/// Rewrite a cover link so it points at the largest rendition.
///
/// - `http://` becomes `https://`
/// - `&zoom=N` and `&edge=curl` are removed
/// - `sz=thumbnail|small|medium` becomes `sz=large`
/// - `zoom=0` is appended when no zoom parameter is left
pub fn enhance_cover_url(url: &str) -> String {
    let url = url.trim().replacen("http://", "https://", 1);
    let url = ZOOM_PARAM.replace(&url, "");
    let url = EDGE_CURL_PARAM.replace(&url, "");
    let mut url = SIZE_PARAM.replace(&url, "sz=large").into_owned();

    if !url.contains("zoom=") {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str("zoom=0");
    }
    url
}
