//! Result cache in front of the aggregator.
//!
//! [`CacheGateway`] is the only thing the search pipeline talks to. It never
//! fails a request: read errors count as a miss and write errors are logged
//! and dropped. The actual storage sits behind [`CacheBackend`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use medialog_common::{AggregatedSearchResponse, Error, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::CacheConfig;

const KEY_PREFIX: &str = "search:";
const REST_TIMEOUT: Duration = Duration::from_secs(2);

/// Cache key for an already-normalized query.
///
/// Normalization is repeated here so callers can never produce two keys for
/// queries that differ only in case or surrounding whitespace.
pub fn cache_key(normalized: &str) -> String {
    format!("{KEY_PREFIX}{}", normalized.to_lowercase().trim())
}

/// Raw string storage with per-key expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short identifier reported by `/health`.
    fn name(&self) -> &'static str;

    /// Fetch the stored value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` for `ttl_secs` seconds, overwriting any previous value.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Injectable cache handle used by the search service.
#[derive(Clone)]
pub enum CacheGateway {
    /// Backed by a real store.
    Configured {
        backend: Arc<dyn CacheBackend>,
        ttl_secs: u64,
    },
    /// No store; every read misses and writes are discarded.
    Unconfigured,
}

impl CacheGateway {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn CacheBackend>, ttl_secs: u64) -> Self {
        Self::Configured { backend, ttl_secs }
    }

    /// Pick a backend from configuration.
    ///
    /// A complete URL/token pair selects the REST cache. Half a pair is
    /// reported and ignored. Otherwise the in-memory cache is used when
    /// enabled.
    pub fn from_config(config: &CacheConfig) -> anyhow::Result<Self> {
        if let Some((url, token)) = config.rest_credentials() {
            let backend = UpstashCache::new(url, token)?;
            return Ok(Self::new(Arc::new(backend), config.ttl_secs));
        }
        if config.is_incomplete() {
            warn!("Cache URL and token must be set together; caching disabled");
            return Ok(Self::Unconfigured);
        }
        if config.in_memory {
            let backend = MemoryCache::new(config.max_entries);
            return Ok(Self::new(Arc::new(backend), config.ttl_secs));
        }
        Ok(Self::Unconfigured)
    }

    /// Backend name for `/health`, `"disabled"` when unconfigured.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Configured { backend, .. } => backend.name(),
            Self::Unconfigured => "disabled",
        }
    }

    /// Look up a stored response. Never fails.
    pub async fn read(&self, normalized: &str) -> Option<AggregatedSearchResponse> {
        let Self::Configured { backend, .. } = self else {
            return None;
        };
        let key = cache_key(normalized);

        let raw = match backend.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(key = %key, error = %e, "Cached payload is not a search response, ignoring");
                None
            }
        }
    }

    /// Store a response. Failures are logged and dropped.
    pub async fn write(&self, normalized: &str, response: &AggregatedSearchResponse) {
        let Self::Configured { backend, ttl_secs } = self else {
            return;
        };
        let key = cache_key(normalized);

        let payload = match serde_json::to_string(response) {
            Ok(p) => p,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize search response for cache");
                return;
            }
        };

        match backend.set(&key, &payload, *ttl_secs).await {
            Ok(()) => debug!(key = %key, ttl_secs, "Cached search response"),
            Err(e) => warn!(key = %key, error = %e, "Cache write failed"),
        }
    }
}

impl std::fmt::Debug for CacheGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured { backend, ttl_secs } => f
                .debug_struct("Configured")
                .field("backend", &backend.name())
                .field("ttl_secs", ttl_secs)
                .finish(),
            Self::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}

// ---------------------------------------------------------------------------
// Upstash (Redis over REST)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RestReply {
    result: Option<serde_json::Value>,
    error: Option<String>,
}

/// Redis-compatible cache reached through the Upstash REST protocol.
pub struct UpstashCache {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl UpstashCache {
    pub fn new(url: &str, token: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(REST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn command(&self, args: &[&str]) -> Result<Option<serde_json::Value>> {
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await
            .map_err(|e| Error::cache(e.without_url().to_string()))?;

        let status = resp.status();
        let reply: RestReply = resp
            .json()
            .await
            .map_err(|e| Error::cache(format!("HTTP {status}: {}", e.without_url())))?;

        if let Some(message) = reply.error {
            return Err(Error::cache(message));
        }
        if !status.is_success() {
            return Err(Error::cache(format!("HTTP {status}")));
        }
        Ok(reply.result.filter(|v| !v.is_null()))
    }
}

#[async_trait]
impl CacheBackend for UpstashCache {
    fn name(&self) -> &'static str {
        "upstash"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.command(&["GET", key]).await? {
            Some(serde_json::Value::String(s)) => Ok(Some(s)),
            Some(other) => Ok(Some(other.to_string())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let ttl = ttl_secs.to_string();
        self.command(&["SET", key, value, "EX", &ttl]).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

struct MemoryEntry {
    value: String,
    inserted: Instant,
    expires: Instant,
}

/// Process-local cache with per-entry expiry and a bounded entry count.
pub struct MemoryCache {
    entries: DashMap<String, MemoryEntry>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, expired ones included until touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires > now);
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.inserted)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires > Instant::now() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let now = Instant::now();
        let expires = now
            .checked_add(Duration::from_secs(ttl_secs))
            .ok_or_else(|| Error::cache(format!("TTL of {ttl_secs}s is out of range")))?;
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.cleanup_expired();
            if self.entries.len() >= self.max_entries {
                self.evict_oldest();
            }
        }
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                inserted: now,
                expires,
            },
        );
        Ok(())
    }
}
