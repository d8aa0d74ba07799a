//! Medialog-Common: shared search types and the unified error type.
//!
//! - **Types**: [`MediaKind`], [`UnifiedMediaResult`], [`AggregatedSearchResponse`],
//!   [`SourceBreakdown`] and the serve-time [`CacheStatus`].
//! - **Errors**: [`Error`] and the [`Result`] alias used by every search component.
//!
//! # Examples
//!
//! ```
//! use medialog_common::{MediaKind, UnifiedMediaResult};
//!
//! let result = UnifiedMediaResult::new(MediaKind::Tv, "1396", "Breaking Bad", None, Some(2008));
//! assert_eq!(result.id, "tmdb-tv-1396");
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
