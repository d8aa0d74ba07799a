//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires stub search sources and a counting
//! in-memory cache into a full [`AppContext`]. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http_body_util::BodyExt;

use medialog::config::Config;
use medialog::search::{
    Aggregator, CacheBackend, CacheGateway, MemoryCache, SearchService, SearchSource,
};
use medialog::server::{create_router, AppContext};
use medialog_common::{Error, MediaKind, Result, UnifiedMediaResult};

/// What a [`StubSource`] does when searched.
pub enum Behaviour {
    Return(Vec<UnifiedMediaResult>),
    Fail,
    Hang,
}

/// Search source with canned output and a call counter.
pub struct StubSource {
    name: &'static str,
    kind: MediaKind,
    available: bool,
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new(kind: MediaKind, behaviour: Behaviour) -> Self {
        let name = match kind {
            MediaKind::Movie => "stub-movie",
            MediaKind::Tv => "stub-tv",
            MediaKind::Anime => "stub-anime",
            MediaKind::Book => "stub-book",
        };
        Self {
            name,
            kind,
            available: true,
            behaviour,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(kind: MediaKind, count: usize) -> Self {
        Self::new(kind, Behaviour::Return(results(kind, count)))
    }

    pub fn failing(kind: MediaKind) -> Self {
        Self::new(kind, Behaviour::Fail)
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchSource for StubSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn search(&self, _query: &str) -> Result<Vec<UnifiedMediaResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Return(results) => Ok(results.clone()),
            Behaviour::Fail => Err(Error::source_unavailable(self.name, "HTTP 503")),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

/// In-memory cache that counts every backend call.
pub struct CountingCache {
    inner: MemoryCache,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl CountingCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryCache::new(64),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheBackend for CountingCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl_secs).await
    }
}

/// `count` distinct results of one kind, titled `"<kind> <n>"`.
pub fn results(kind: MediaKind, count: usize) -> Vec<UnifiedMediaResult> {
    (0..count)
        .map(|i| {
            UnifiedMediaResult::new(
                kind,
                1000 + i,
                format!("{kind} {i}"),
                Some(format!("https://img.example/{kind}/{i}.jpg")),
                Some(2000 + i as i32),
            )
        })
        .collect()
}

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub sources: Vec<Arc<StubSource>>,
    pub cache: Arc<CountingCache>,
}

impl TestHarness {
    /// Two movies, one show, three anime and two books.
    pub fn new() -> Self {
        Self::with_sources(vec![
            StubSource::returning(MediaKind::Movie, 2),
            StubSource::returning(MediaKind::Tv, 1),
            StubSource::returning(MediaKind::Anime, 3),
            StubSource::returning(MediaKind::Book, 2),
        ])
    }

    /// Create a harness around the given sources, registered in order.
    pub fn with_sources(sources: Vec<StubSource>) -> Self {
        let sources: Vec<Arc<StubSource>> = sources.into_iter().map(Arc::new).collect();
        let cache = Arc::new(CountingCache::new());

        let mut aggregator = Aggregator::new(Duration::from_millis(300));
        for source in &sources {
            aggregator.register(source.clone());
        }

        let config = Config::default();
        let search = SearchService::new(
            config.search.max_query_length,
            CacheGateway::new(cache.clone(), config.cache.ttl_secs),
            aggregator,
        );

        let ctx = AppContext {
            search: Arc::new(search),
        };

        Self {
            ctx,
            sources,
            cache,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// Total adapter calls across all sources.
    pub fn source_calls(&self) -> usize {
        self.sources.iter().map(|s| s.calls()).sum()
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = harness.router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }
}

/// Helper to get a response body as JSON.
pub async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
