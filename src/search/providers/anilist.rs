//! AniList anime source.
//!
//! Issues a single GraphQL query against the public AniList endpoint. No
//! credentials are needed, so the source is always available.

use async_trait::async_trait;
use medialog_common::{Error, MediaKind, Result, UnifiedMediaResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AniListConfig;
use crate::search::source::{
    decode_error, ensure_success, pick_title, resolve_image_url, transport_error, SearchSource,
    MAX_RESULTS_PER_SOURCE,
};

const PROVIDER: &str = "anilist";
const IMAGE_BASE: &str = "https://s4.anilist.co";

const SEARCH_QUERY: &str = r#"
query ($search: String, $page: Int, $perPage: Int) {
  Page(page: $page, perPage: $perPage) {
    media(search: $search, type: ANIME) {
      id
      title { romaji english }
      coverImage { large }
      startDate { year }
    }
  }
}
"#;

// ---------------------------------------------------------------------------
// GraphQL wire types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: SearchVariables<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchVariables<'a> {
    search: &'a str,
    page: u32,
    per_page: usize,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "Page")]
    page: Option<MediaPage>,
}

#[derive(Debug, Deserialize)]
struct MediaPage {
    media: Option<Vec<AniListMedia>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AniListMedia {
    id: Option<u64>,
    title: Option<AniListTitle>,
    cover_image: Option<AniListCoverImage>,
    start_date: Option<AniListDate>,
}

#[derive(Debug, Deserialize)]
struct AniListTitle {
    romaji: Option<String>,
    english: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AniListCoverImage {
    large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AniListDate {
    year: Option<i32>,
}

fn map_media(m: AniListMedia) -> Option<UnifiedMediaResult> {
    let id = m.id?;
    let (english, romaji) = match m.title {
        Some(t) => (t.english, t.romaji),
        None => (None, None),
    };
    let cover = m.cover_image.and_then(|c| c.large);
    Some(UnifiedMediaResult::new(
        MediaKind::Anime,
        id,
        pick_title([english, romaji]),
        resolve_image_url(IMAGE_BASE, cover.as_deref()),
        m.start_date.and_then(|d| d.year).filter(|y| *y > 0),
    ))
}

/// Extract the media list, treating a GraphQL error without data as a failure.
fn into_media(resp: GraphQlResponse) -> Result<Vec<AniListMedia>> {
    match resp.data {
        Some(data) => Ok(data.page.and_then(|p| p.media).unwrap_or_default()),
        None => {
            let message = resp
                .errors
                .unwrap_or_default()
                .into_iter()
                .filter_map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            Err(Error::source_unavailable(
                PROVIDER,
                if message.is_empty() {
                    "response carried no data".to_string()
                } else {
                    format!("GraphQL error: {message}")
                },
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Anime search backed by the AniList GraphQL API.
pub struct AniListSource {
    http: reqwest::Client,
    endpoint: String,
    limit: usize,
}

impl AniListSource {
    pub fn new(http: reqwest::Client, config: &AniListConfig, limit: usize) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            limit: limit.min(MAX_RESULTS_PER_SOURCE),
        }
    }
}

#[async_trait]
impl SearchSource for AniListSource {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn kind(&self) -> MediaKind {
        MediaKind::Anime
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search(&self, query: &str) -> Result<Vec<UnifiedMediaResult>> {
        let request = GraphQlRequest {
            query: SEARCH_QUERY,
            variables: SearchVariables {
                search: query,
                page: 1,
                per_page: self.limit,
            },
        };
        debug!(endpoint = %self.endpoint, query, "AniList search");

        let resp = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let resp = ensure_success(PROVIDER, resp).await?;

        let body: GraphQlResponse = resp.json().await.map_err(|e| decode_error(PROVIDER, e))?;

        Ok(into_media(body)?
            .into_iter()
            .filter_map(map_media)
            .take(self.limit)
            .collect())
    }
}
