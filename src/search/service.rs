//! The search pipeline: validate, cache read, fan-out, assemble, cache write.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use medialog_common::{AggregatedSearchResponse, CacheStatus, MediaKind, Result};
use tracing::{debug, info};

use super::aggregator::{Aggregation, Aggregator};
use super::cache::CacheGateway;
use super::providers::{
    AniListSource, GoogleBooksSource, TmdbClient, TmdbMovieSource, TmdbTvSource,
};
use super::validate::validate_query;
use crate::config::Config;

/// A served search response and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub response: AggregatedSearchResponse,
    pub cache_status: CacheStatus,
}

/// Availability of one registered source, as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub name: &'static str,
    pub kind: MediaKind,
    pub available: bool,
}

/// Build the response payload. `total` always equals `results.len()`.
pub fn assemble(query: &str, aggregation: Aggregation) -> AggregatedSearchResponse {
    let Aggregation { results, breakdown } = aggregation;
    AggregatedSearchResponse {
        query: query.to_string(),
        total: results.len(),
        results,
        breakdown,
    }
}

/// Federated media search over all configured sources.
pub struct SearchService {
    max_query_length: usize,
    cache: CacheGateway,
    aggregator: Aggregator,
}

impl SearchService {
    pub fn new(max_query_length: usize, cache: CacheGateway, aggregator: Aggregator) -> Self {
        Self {
            max_query_length,
            cache,
            aggregator,
        }
    }

    /// Wire up the four production sources and the configured cache.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.search.source_timeout_secs);
        let limit = config.search.results_per_source;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("medialog/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let tmdb = Arc::new(TmdbClient::new(http.clone(), &config.tmdb));

        let mut aggregator = Aggregator::new(timeout);
        aggregator.register(Arc::new(TmdbMovieSource::new(tmdb.clone(), limit)));
        aggregator.register(Arc::new(TmdbTvSource::new(tmdb, limit)));
        aggregator.register(Arc::new(AniListSource::new(http.clone(), &config.anilist, limit)));
        aggregator.register(Arc::new(GoogleBooksSource::new(http, &config.google_books, limit)));

        let cache = CacheGateway::from_config(&config.cache)?;

        info!(
            sources = aggregator.available().len(),
            cache = cache.mode(),
            "Search service ready"
        );

        Ok(Self::new(config.search.max_query_length, cache, aggregator))
    }

    /// Run one search. Only an invalid query produces an error.
    pub async fn search(&self, raw: Option<&str>) -> Result<SearchOutcome> {
        let query = validate_query(raw, self.max_query_length)?;

        if let Some(response) = self.cache.read(&query.normalized).await {
            debug!(query = %query.normalized, "Cache hit");
            return Ok(SearchOutcome {
                response,
                cache_status: CacheStatus::Hit,
            });
        }

        let aggregation = self.aggregator.aggregate(&query.original).await;
        let response = assemble(&query.original, aggregation);
        debug!(
            query = %query.normalized,
            total = response.total,
            "Aggregated search response"
        );

        self.cache.write(&query.normalized, &response).await;

        Ok(SearchOutcome {
            response,
            cache_status: CacheStatus::Miss,
        })
    }

    /// Registered sources and whether each can be called.
    pub fn sources(&self) -> Vec<SourceStatus> {
        self.aggregator
            .sources()
            .iter()
            .map(|s| SourceStatus {
                name: s.name(),
                kind: s.kind(),
                available: s.is_available(),
            })
            .collect()
    }

    /// Cache backend name, `"disabled"` when there is none.
    pub fn cache_mode(&self) -> &'static str {
        self.cache.mode()
    }
}
