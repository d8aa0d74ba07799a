//! Core search types shared by the adapters, the aggregator and the HTTP layer.
//!
//! All wire names follow the JSON contract of the search endpoint:
//! results carry `type` and `imageUrl`, the breakdown uses plural source names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when a source returns a record without a usable title.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Response header carrying the [`CacheStatus`] of a search response.
pub const CACHE_STATUS_HEADER: &str = "x-cache-status";

/// Kind of media a search result describes.
///
/// The declaration order is the merge priority of the aggregated response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A theatrical or streaming film.
    Movie,
    /// A television series.
    Tv,
    /// An anime series or film.
    Anime,
    /// A book volume.
    Book,
}

impl MediaKind {
    /// Every kind, in merge priority order.
    pub const ALL: [MediaKind; 4] = [Self::Movie, Self::Tv, Self::Anime, Self::Book];

    /// Structural prefix prepended to a source's native id.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Movie => "tmdb-",
            Self::Tv => "tmdb-tv-",
            Self::Anime => "anilist-",
            Self::Book => "gbooks-",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Tv => write!(f, "tv"),
            Self::Anime => write!(f, "anime"),
            Self::Book => write!(f, "book"),
        }
    }
}

/// A normalized search hit, identical in shape for every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedMediaResult {
    /// Globally unique id: source prefix followed by the native id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Media kind, fixed by the source that produced the result.
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Absolute URL of a cover or poster image.
    pub image_url: Option<String>,
    /// Release, air or publication year.
    pub year: Option<i32>,
}

impl UnifiedMediaResult {
    /// Build a result, deriving the id from `kind` and the native id.
    pub fn new(
        kind: MediaKind,
        native_id: impl fmt::Display,
        title: impl Into<String>,
        image_url: Option<String>,
        year: Option<i32>,
    ) -> Self {
        Self {
            id: format!("{}{}", kind.id_prefix(), native_id),
            title: title.into(),
            kind,
            image_url,
            year,
        }
    }
}

/// Per-source result counts of an aggregated response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub movies: usize,
    pub tv: usize,
    pub anime: usize,
    pub books: usize,
}

impl SourceBreakdown {
    /// Count contributed by the source of the given kind.
    pub fn get(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Movie => self.movies,
            MediaKind::Tv => self.tv,
            MediaKind::Anime => self.anime,
            MediaKind::Book => self.books,
        }
    }

    /// Add `count` results to the slot of the given kind.
    pub fn record(&mut self, kind: MediaKind, count: usize) {
        let slot = match kind {
            MediaKind::Movie => &mut self.movies,
            MediaKind::Tv => &mut self.tv,
            MediaKind::Anime => &mut self.anime,
            MediaKind::Book => &mut self.books,
        };
        *slot += count;
    }

    /// Sum of all per-source counts.
    pub fn total(&self) -> usize {
        self.movies + self.tv + self.anime + self.books
    }
}

/// Payload returned by the search endpoint and stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedSearchResponse {
    /// The query exactly as received, untrimmed.
    pub query: String,
    /// Number of entries in `results`.
    pub total: usize,
    /// Results ordered movie, tv, anime, book.
    pub results: Vec<UnifiedMediaResult>,
    /// Per-source counts.
    pub breakdown: SourceBreakdown,
}

/// Whether a response was served from the cache.
///
/// Computed when the response is served; never part of the cached payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Header value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
