//! Discogs API client
//!
//! Release search and detail lookup against the Discogs database API,
//! with request rate limiting. This module owns the conversion from
//! Discogs response shapes to the crate's `Candidate` / `ReleaseDetail`
//! models; nothing downstream probes upstream JSON.

use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::models::{Candidate, ReleaseDetail};
use crate::types::{CatalogError, ReleaseCatalog};

const DISCOGS_BASE_URL: &str = "https://api.discogs.com";
const USER_AGENT: &str = "CDCollectionAgent/1.0";
const RATE_LIMIT_MS: u64 = 1000; // authenticated quota is 60 requests/minute

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Discogs search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// One Discogs search result.
///
/// Search results carry the artist and title combined ("Artist - Title")
/// and the year as a string; the conversion below is the single place
/// where those quirks are unfolded.
#[derive(Debug, Deserialize)]
struct SearchResult {
    id: u64,
    title: String,
    year: Option<String>,
    country: Option<String>,
    #[serde(default)]
    label: Vec<String>,
    #[serde(default)]
    format: Vec<String>,
}

/// Discogs release detail response
#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    id: u64,
    title: String,
    year: Option<u16>,
    #[serde(default)]
    artists: Vec<NamedEntry>,
    #[serde(default)]
    labels: Vec<NamedEntry>,
    #[serde(default)]
    formats: Vec<NamedEntry>,
    #[serde(default)]
    tracklist: Vec<TrackEntry>,
    country: Option<String>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    styles: Vec<String>,
    #[serde(default)]
    images: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TrackEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    uri: Option<String>,
    #[serde(rename = "uri150")]
    uri_150: Option<String>,
    resource_url: Option<String>,
}

/// Split a combined "Artist - Title" search title on the first " - ".
/// Titles without the delimiter yield an empty artist.
fn split_search_title(raw: &str) -> (String, String) {
    match raw.split_once(" - ") {
        Some((artist, title)) => (artist.trim().to_string(), title.trim().to_string()),
        None => (String::new(), raw.trim().to_string()),
    }
}

fn candidate_from_search(result: SearchResult) -> Candidate {
    let (artist, title) = split_search_title(&result.title);
    let label = if result.label.is_empty() {
        None
    } else {
        Some(result.label.join(", "))
    };
    Candidate {
        id: result.id,
        title,
        artist,
        year: result.year.and_then(|y| y.parse().ok()),
        country: result.country,
        label,
        formats: result.format,
    }
}

fn detail_from_release(release: ReleaseResponse) -> ReleaseDetail {
    let artist = release
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let images = release
        .images
        .into_iter()
        .filter_map(|im| im.uri.or(im.uri_150).or(im.resource_url))
        .collect();
    ReleaseDetail {
        discogs_id: release.id,
        title: release.title,
        artist,
        year: release.year,
        labels: release.labels.into_iter().map(|l| l.name).collect(),
        formats: release.formats.into_iter().map(|f| f.name).collect(),
        tracklist: release.tracklist.into_iter().map(|t| t.title).collect(),
        country: release.country,
        genres: release.genres,
        styles: release.styles,
        images,
    }
}

/// Discogs API client
pub struct DiscogsClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    token: String,
}

impl DiscogsClient {
    pub fn new(token: String) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
            token,
        })
    }

    fn auth_header(&self) -> String {
        format!("Discogs token={}", self.token)
    }
}

#[async_trait::async_trait]
impl ReleaseCatalog for DiscogsClient {
    /// Search Discogs for releases matching `query`.
    ///
    /// Best-effort: returns up to `limit` candidates, possibly zero.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, CatalogError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/database/search", DISCOGS_BASE_URL);
        tracing::debug!(query = %query, limit, "Querying Discogs search API");

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .query(&[
                ("q", query.to_string()),
                ("type", "release".to_string()),
                ("per_page", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status == 429 {
            return Err(CatalogError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let candidates: Vec<Candidate> = search
            .results
            .into_iter()
            .take(limit)
            .map(candidate_from_search)
            .collect();

        tracing::info!(
            query = %query,
            candidates = candidates.len(),
            "Discogs search completed"
        );

        Ok(candidates)
    }

    /// Fetch full metadata for one release id.
    async fn fetch_detail(&self, id: u64) -> Result<ReleaseDetail, CatalogError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/releases/{}", DISCOGS_BASE_URL, id);
        tracing::debug!(release_id = id, url = %url, "Querying Discogs release API");

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status == 404 {
            return Err(CatalogError::NotFound(id));
        }
        if status == 429 {
            return Err(CatalogError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let release: ReleaseResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        let detail = detail_from_release(release);

        tracing::info!(
            release_id = id,
            title = %detail.title,
            artist = %detail.artist,
            "Retrieved release detail from Discogs"
        );

        Ok(detail)
    }
}
