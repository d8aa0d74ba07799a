//! Unified error type for medialog.
//!
//! Search components funnel their failures into [`Error`]. Only
//! [`Error::InvalidQuery`] and [`Error::Internal`] are expected to reach the
//! HTTP boundary; source and cache failures are recovered where they occur.

/// Unified error type covering all failure modes of the search pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The search query violates the validation rules.
    #[error("{0}")]
    InvalidQuery(String),

    /// A single content source could not produce results.
    #[error("Source unavailable [{provider}]: {message}")]
    SourceUnavailable {
        /// Name of the source that failed (e.g. "tmdb-movie").
        provider: String,
        /// Human-readable failure description.
        message: String,
    },

    /// The cache backend could not be read or written.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidQuery(_) => 400,
            Error::SourceUnavailable { .. } => 502,
            Error::CacheUnavailable(_) => 503,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidQuery(_) => "invalid_query",
            Error::SourceUnavailable { .. } => "source_unavailable",
            Error::CacheUnavailable(_) => "cache_unavailable",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::InvalidQuery`].
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Error::InvalidQuery(msg.into())
    }

    /// Convenience constructor for [`Error::SourceUnavailable`].
    pub fn source_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::CacheUnavailable`].
    pub fn cache(msg: impl Into<String>) -> Self {
        Error::CacheUnavailable(msg.into())
    }

    /// Convenience constructor for [`Error::Internal`].
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
