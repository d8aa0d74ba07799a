//! Federated media search.
//!
//! A query fans out to every [`SearchSource`], the per-source results are
//! merged into one [`AggregatedSearchResponse`](medialog_common::AggregatedSearchResponse),
//! and the merged response is cached under the normalized query.

pub mod aggregator;
pub mod cache;
pub mod providers;
pub mod service;
pub mod source;
pub mod validate;

pub use aggregator::{Aggregation, Aggregator};
pub use cache::{cache_key, CacheBackend, CacheGateway, MemoryCache, UpstashCache};
pub use service::{assemble, SearchOutcome, SearchService, SourceStatus};
pub use source::{SearchSource, MAX_RESULTS_PER_SOURCE};
pub use validate::{normalize_query, validate_query, ValidatedQuery, MAX_QUERY_LENGTH};
