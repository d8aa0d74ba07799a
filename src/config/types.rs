use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub anilist: AniListConfig,

    #[serde(default)]
    pub google_books: GoogleBooksConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Longest accepted query, in characters
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Upper bound on a single source call, including retries
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,

    /// Results kept from each source (1-10)
    #[serde(default = "default_results_per_source")]
    pub results_per_source: usize,
}

fn default_max_query_length() -> usize {
    200
}
fn default_source_timeout() -> u64 {
    8
}
fn default_results_per_source() -> usize {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_query_length: default_max_query_length(),
            source_timeout_secs: default_source_timeout(),
            results_per_source: default_results_per_source(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// API key; the movie and TV sources are disabled without one
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,

    /// Prefix joined with the relative `poster_path` of each result
    #[serde(default = "default_tmdb_image_base_url")]
    pub image_base_url: String,

    #[serde(default = "default_tmdb_language")]
    pub language: String,
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}
fn default_tmdb_language() -> String {
    "en-US".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tmdb_base_url(),
            image_base_url: default_tmdb_image_base_url(),
            language: default_tmdb_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AniListConfig {
    #[serde(default = "default_anilist_endpoint")]
    pub endpoint: String,
}

fn default_anilist_endpoint() -> String {
    "https://graphql.anilist.co".to_string()
}

impl Default for AniListConfig {
    fn default() -> Self {
        Self {
            endpoint: default_anilist_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleBooksConfig {
    /// Optional API key, appended as `key=` when present
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_google_books_base_url")]
    pub base_url: String,
}

fn default_google_books_base_url() -> String {
    "https://www.googleapis.com/books/v1".to_string()
}

impl Default for GoogleBooksConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_google_books_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// REST endpoint of the Redis-compatible cache (both-or-neither with `token`)
    #[serde(default)]
    pub url: Option<String>,

    /// Bearer token for the REST cache
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Fall back to a process-local cache when no REST cache is configured
    #[serde(default)]
    pub in_memory: bool,

    /// Capacity of the process-local cache
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

fn default_cache_ttl() -> u64 {
    86_400
}
fn default_cache_max_entries() -> usize {
    1024
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            ttl_secs: default_cache_ttl(),
            in_memory: false,
            max_entries: default_cache_max_entries(),
        }
    }
}

impl CacheConfig {
    /// URL and token of the REST cache, when both are set.
    pub fn rest_credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.token.as_deref()) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => {
                Some((url, token))
            }
            _ => None,
        }
    }

    /// True when exactly one half of the URL/token pair is set.
    pub fn is_incomplete(&self) -> bool {
        let url = self.url.as_deref().is_some_and(|u| !u.is_empty());
        let token = self.token.as_deref().is_some_and(|t| !t.is_empty());
        url != token
    }
}
