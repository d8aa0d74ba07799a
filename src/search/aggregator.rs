//! Concurrent fan-out across all registered [`SearchSource`]s.
//!
//! The [`Aggregator`] calls every source at once, waits for all of them to
//! settle, and merges the successful lists in [`MediaKind`] priority order.
//! A failed, unavailable or timed-out source contributes nothing; it never
//! fails the aggregation.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use medialog_common::{Error, MediaKind, Result, SourceBreakdown, UnifiedMediaResult};
use tracing::{debug, warn};

use super::source::{SearchSource, MAX_RESULTS_PER_SOURCE};

/// Merged results of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Results concatenated movie, tv, anime, book.
    pub results: Vec<UnifiedMediaResult>,
    /// Per-kind counts of `results`.
    pub breakdown: SourceBreakdown,
}

/// Outcome of a single source call.
struct Settled {
    name: &'static str,
    kind: MediaKind,
    outcome: Result<Vec<UnifiedMediaResult>>,
}

/// Fan-out/fan-in coordinator over a set of search sources.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use std::time::Duration;
/// use medialog::search::Aggregator;
///
/// let mut aggregator = Aggregator::new(Duration::from_secs(8));
/// aggregator.register(Arc::new(my_source));
///
/// let merged = aggregator.aggregate("Inception").await;
/// assert_eq!(merged.results.len(), merged.breakdown.total());
/// ```
pub struct Aggregator {
    sources: Vec<Arc<dyn SearchSource>>,
    timeout: Duration,
}

impl Aggregator {
    /// Create an aggregator with no sources and the given per-source timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            sources: Vec::new(),
            timeout,
        }
    }

    /// Register a source. Registration order only breaks ties between
    /// sources of the same kind.
    pub fn register(&mut self, source: Arc<dyn SearchSource>) {
        self.sources.push(source);
    }

    /// All registered sources.
    pub fn sources(&self) -> &[Arc<dyn SearchSource>] {
        &self.sources
    }

    /// Sources that currently have the credentials they need.
    pub fn available(&self) -> Vec<&dyn SearchSource> {
        self.sources
            .iter()
            .filter(|s| s.is_available())
            .map(|s| s.as_ref())
            .collect()
    }

    /// Query every source concurrently and merge what succeeded.
    pub async fn aggregate(&self, query: &str) -> Aggregation {
        let calls = self.sources.iter().map(|s| self.settle(s.as_ref(), query));
        let mut settled = join_all(calls).await;

        // Stable, so same-kind sources keep registration order.
        settled.sort_by_key(|s| s.kind);

        let mut aggregation = Aggregation::default();
        for Settled {
            name,
            kind,
            outcome,
        } in settled
        {
            match outcome {
                Ok(results) => {
                    debug!(source = name, count = results.len(), "Search source settled");
                    aggregation.breakdown.record(kind, results.len());
                    aggregation.results.extend(results);
                }
                Err(e) => {
                    warn!(
                        source = name,
                        error = %e,
                        "Search source failed, contributing no results"
                    );
                }
            }
        }
        aggregation
    }

    async fn settle(&self, source: &dyn SearchSource, query: &str) -> Settled {
        let name = source.name();
        let kind = source.kind();

        if !source.is_available() {
            debug!(source = name, "Search source not configured, skipping");
            return Settled {
                name,
                kind,
                outcome: Ok(Vec::new()),
            };
        }

        let outcome = match tokio::time::timeout(self.timeout, source.search(query)).await {
            Ok(Ok(mut results)) => {
                let before = results.len();
                results.retain(|r| r.kind == kind);
                if results.len() < before {
                    warn!(
                        source = name,
                        dropped = before - results.len(),
                        "Search source returned results of another kind, dropping them"
                    );
                }
                results.truncate(MAX_RESULTS_PER_SOURCE);
                Ok(results)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::source_unavailable(
                name,
                format!("timed out after {}s", self.timeout.as_secs_f32()),
            )),
        };

        Settled {
            name,
            kind,
            outcome,
        }
    }
}
