//! TMDB (The Movie Database) movie and TV sources.
//!
//! Both sources share one [`TmdbClient`] so they draw from the same rate
//! limiter and connection pool.
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - Relative `poster_path` values resolved against the configured image base.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use medialog_common::{Error, MediaKind, Result, UnifiedMediaResult};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::TmdbConfig;
use crate::search::source::{
    decode_error, ensure_success, parse_year, pick_title, resolve_image_url, transport_error,
    SearchSource, MAX_RESULTS_PER_SOURCE,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const REQUESTS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(4) {
    Some(n) => n,
    None => unreachable!(),
};
const MAX_RETRIES: u32 = 3;
const MAX_RETRY_WAIT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse<T> {
    results: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    id: Option<u64>,
    title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvSearchResult {
    id: Option<u64>,
    name: Option<String>,
    first_air_date: Option<String>,
    poster_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Rate-limited TMDB v3 search client.
pub struct TmdbClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    image_base_url: String,
    language: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbClient {
    /// Create a client from configuration. A missing or empty API key leaves
    /// the client unavailable.
    pub fn new(http: reqwest::Client, config: &TmdbConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.clone(),
            language: config.language.clone(),
            rate_limiter: RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND)),
        }
    }

    /// Returns `true` when an API key is configured.
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Execute a search request with rate limiting and 429-retry logic.
    async fn search<T: serde::de::DeserializeOwned>(
        &self,
        provider: &'static str,
        path: &str,
        query: &str,
    ) -> Result<Vec<T>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::source_unavailable(provider, "no TMDB API key configured"))?;

        let url = format!("{}{path}", self.base_url);
        let params = [
            ("api_key", api_key),
            ("query", query),
            ("language", self.language.as_str()),
            ("page", "1"),
        ];
        debug!(path, query, "TMDB search");

        let mut retries = 0u32;
        let resp = loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .http
                .get(&url)
                .query(&params)
                .send()
                .await
                .map_err(|e| transport_error(provider, e))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(Duration::from_secs(1))
                    .min(MAX_RETRY_WAIT);
                warn!(
                    provider,
                    retry = retries,
                    wait_secs = wait.as_secs(),
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            break ensure_success(provider, resp).await?;
        };

        let body: TmdbSearchResponse<T> =
            resp.json().await.map_err(|e| decode_error(provider, e))?;
        Ok(body.results.unwrap_or_default())
    }
}

fn map_movie(r: TmdbMovieSearchResult, image_base: &str) -> Option<UnifiedMediaResult> {
    let id = r.id?;
    Some(UnifiedMediaResult::new(
        MediaKind::Movie,
        id,
        pick_title([r.title]),
        resolve_image_url(image_base, r.poster_path.as_deref()),
        parse_year(r.release_date.as_deref()),
    ))
}

fn map_tv(r: TmdbTvSearchResult, image_base: &str) -> Option<UnifiedMediaResult> {
    let id = r.id?;
    Some(UnifiedMediaResult::new(
        MediaKind::Tv,
        id,
        pick_title([r.name]),
        resolve_image_url(image_base, r.poster_path.as_deref()),
        parse_year(r.first_air_date.as_deref()),
    ))
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Movie search backed by `/search/movie`.
pub struct TmdbMovieSource {
    client: Arc<TmdbClient>,
    limit: usize,
}

impl TmdbMovieSource {
    pub fn new(client: Arc<TmdbClient>, limit: usize) -> Self {
        Self {
            client,
            limit: limit.min(MAX_RESULTS_PER_SOURCE),
        }
    }
}

#[async_trait]
impl SearchSource for TmdbMovieSource {
    fn name(&self) -> &'static str {
        "tmdb-movie"
    }

    fn kind(&self) -> MediaKind {
        MediaKind::Movie
    }

    fn is_available(&self) -> bool {
        self.client.is_available()
    }

    async fn search(&self, query: &str) -> Result<Vec<UnifiedMediaResult>> {
        let results: Vec<TmdbMovieSearchResult> =
            self.client.search(self.name(), "/search/movie", query).await?;
        Ok(results
            .into_iter()
            .filter_map(|r| map_movie(r, &self.client.image_base_url))
            .take(self.limit)
            .collect())
    }
}

/// TV search backed by `/search/tv`.
pub struct TmdbTvSource {
    client: Arc<TmdbClient>,
    limit: usize,
}

impl TmdbTvSource {
    pub fn new(client: Arc<TmdbClient>, limit: usize) -> Self {
        Self {
            client,
            limit: limit.min(MAX_RESULTS_PER_SOURCE),
        }
    }
}

#[async_trait]
impl SearchSource for TmdbTvSource {
    fn name(&self) -> &'static str {
        "tmdb-tv"
    }

    fn kind(&self) -> MediaKind {
        MediaKind::Tv
    }

    fn is_available(&self) -> bool {
        self.client.is_available()
    }

    async fn search(&self, query: &str) -> Result<Vec<UnifiedMediaResult>> {
        let results: Vec<TmdbTvSearchResult> =
            self.client.search(self.name(), "/search/tv", query).await?;
        Ok(results
            .into_iter()
            .filter_map(|r| map_tv(r, &self.client.image_base_url))
            .take(self.limit)
            .collect())
    }
}
