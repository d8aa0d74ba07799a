//! Google Books volume source.
//!
//! The API key is optional; anonymous requests are allowed at a lower quota.

use async_trait::async_trait;
use medialog_common::{MediaKind, Result, UnifiedMediaResult};
use serde::Deserialize;
use tracing::debug;

use crate::config::GoogleBooksConfig;
use crate::search::source::{
    decode_error, ensure_success, parse_year, pick_title, resolve_image_url, transport_error,
    SearchSource, MAX_RESULTS_PER_SOURCE,
};

const PROVIDER: &str = "google-books";
const IMAGE_BASE: &str = "https://books.google.com";

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: Option<String>,
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    published_date: Option<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

fn map_volume(v: Volume) -> Option<UnifiedMediaResult> {
    let id = v.id.filter(|id| !id.trim().is_empty())?;
    let (title, published, thumbnail) = match v.volume_info {
        Some(info) => (
            info.title,
            info.published_date,
            info.image_links.and_then(|l| l.thumbnail),
        ),
        None => (None, None, None),
    };
    Some(UnifiedMediaResult::new(
        MediaKind::Book,
        id,
        pick_title([title]),
        resolve_image_url(IMAGE_BASE, thumbnail.as_deref()),
        parse_year(published.as_deref()),
    ))
}

/// Book search backed by `/volumes`.
pub struct GoogleBooksSource {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    limit: usize,
}

impl GoogleBooksSource {
    pub fn new(http: reqwest::Client, config: &GoogleBooksConfig, limit: usize) -> Self {
        Self {
            http,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: limit.min(MAX_RESULTS_PER_SOURCE),
        }
    }
}

#[async_trait]
impl SearchSource for GoogleBooksSource {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn kind(&self) -> MediaKind {
        MediaKind::Book
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search(&self, query: &str) -> Result<Vec<UnifiedMediaResult>> {
        let url = format!("{}/volumes", self.base_url);
        let max_results = self.limit.to_string();
        let mut params = vec![("q", query), ("maxResults", max_results.as_str())];
        if let Some(ref key) = self.api_key {
            params.push(("key", key.as_str()));
        }
        debug!(query, keyed = self.api_key.is_some(), "Google Books search");

        let resp = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let resp = ensure_success(PROVIDER, resp).await?;

        let body: VolumesResponse = resp.json().await.map_err(|e| decode_error(PROVIDER, e))?;

        Ok(body
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(map_volume)
            .take(self.limit)
            .collect())
    }
}
