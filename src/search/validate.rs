//! Query validation and normalization.
//!
//! Runs before any cache or network I/O. The original query is kept verbatim
//! for echoing back to the caller; the normalized form only feeds the cache
//! key.

use medialog_common::{Error, Result};

/// Default maximum query length, in characters.
pub const MAX_QUERY_LENGTH: usize = 200;

/// A query that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    /// The query exactly as received.
    pub original: String,
    /// Lower-cased and trimmed form used for cache keys.
    pub normalized: String,
}

/// Validate a raw query string against `max_len` characters.
///
/// An absent query, or one that is empty after trimming, is rejected as
/// "Query required". The length limit applies to the untrimmed input.
pub fn validate_query(raw: Option<&str>, max_len: usize) -> Result<ValidatedQuery> {
    let raw = match raw {
        Some(q) if !q.trim().is_empty() => q,
        _ => return Err(Error::invalid_query("Query required")),
    };

    if raw.chars().count() > max_len {
        return Err(Error::invalid_query(format!(
            "Query too long (max {max_len} characters)"
        )));
    }

    Ok(ValidatedQuery {
        original: raw.to_string(),
        normalized: normalize_query(raw),
    })
}

/// Lower-case then trim. Internal whitespace and punctuation are untouched.
pub fn normalize_query(query: &str) -> String {
    query.to_lowercase().trim().to_string()
}
