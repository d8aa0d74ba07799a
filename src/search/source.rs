//! The [`SearchSource`] trait and helpers shared by the concrete adapters.
//!
//! Each adapter wraps one external content API, maps its private wire shape
//! into [`UnifiedMediaResult`]s, and reports every failure as
//! [`Error::SourceUnavailable`]. The aggregator decides what a failure means
//! for the response; adapters only describe it.

use async_trait::async_trait;
use medialog_common::{Error, MediaKind, Result, UnifiedMediaResult, UNKNOWN_TITLE};

/// Maximum number of results any source contributes.
pub const MAX_RESULTS_PER_SOURCE: usize = 10;

/// Async trait implemented by every content source.
///
/// Sources are shared across requests behind an `Arc` and must not hold
/// per-request state.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Short, lowercase identifier used in logs (e.g. `"tmdb-movie"`).
    fn name(&self) -> &'static str;

    /// The single kind of result this source emits.
    fn kind(&self) -> MediaKind;

    /// Returns `false` when required credentials are missing. Unavailable
    /// sources are never called.
    fn is_available(&self) -> bool;

    /// Search for `query`, returning at most [`MAX_RESULTS_PER_SOURCE`]
    /// results in provider order.
    async fn search(&self, query: &str) -> Result<Vec<UnifiedMediaResult>>;
}

/// Extract the year from a date such as `"2010-07-15"`, `"1999-03"` or `"1965"`.
pub fn parse_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.trim().get(..4))
        .and_then(|y| y.parse::<i32>().ok())
        .filter(|y| *y > 0)
}

/// Turn an image reference into an absolute URL.
///
/// Absolute URLs pass through, protocol-relative ones get `https:`, and
/// relative paths are joined onto `base`.
pub fn resolve_image_url(base: &str, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    if path.starts_with("https://") || path.starts_with("http://") {
        return Some(path.to_string());
    }
    if let Some(rest) = path.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    Some(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// First non-blank title among `candidates`, or [`UNKNOWN_TITLE`].
pub fn pick_title<I>(candidates: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// Fail with [`Error::SourceUnavailable`] unless the response is a 2xx.
pub(crate) async fn ensure_success(
    provider: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(Error::source_unavailable(
        provider,
        format!("HTTP {status}: {snippet}"),
    ))
}

/// Map a transport error into [`Error::SourceUnavailable`].
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> Error {
    let detail = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        // Drop the URL, it may carry an API key.
        err.without_url().to_string()
    };
    Error::source_unavailable(provider, detail)
}

/// Map a body decoding error into [`Error::SourceUnavailable`].
pub(crate) fn decode_error(provider: &str, err: reqwest::Error) -> Error {
    Error::source_unavailable(
        provider,
        format!("malformed response: {}", err.without_url()),
    )
}
