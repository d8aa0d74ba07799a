mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variables that override values from the config file.
pub const ENV_TMDB_API_KEY: &str = "TMDB_API_KEY";
pub const ENV_GOOGLE_BOOKS_API_KEY: &str = "GOOGLE_BOOKS_API_KEY";
pub const ENV_CACHE_URL: &str = "UPSTASH_REDIS_REST_URL";
pub const ENV_CACHE_TOKEN: &str = "UPSTASH_REDIS_REST_TOKEN";
pub const ENV_HOST: &str = "MEDIALOG_HOST";
pub const ENV_PORT: &str = "MEDIALOG_PORT";

/// Longest accepted cache TTL (one year).
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./medialog.toml",
        "./config.toml",
        "~/.config/medialog/config.toml",
        "/etc/medialog/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

/// Overlay credentials and bind address from the process environment.
///
/// Empty variables are treated as unset.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(key) = env_value(ENV_TMDB_API_KEY) {
        config.tmdb.api_key = Some(key);
    }
    if let Some(key) = env_value(ENV_GOOGLE_BOOKS_API_KEY) {
        config.google_books.api_key = Some(key);
    }
    if let Some(url) = env_value(ENV_CACHE_URL) {
        config.cache.url = Some(url);
    }
    if let Some(token) = env_value(ENV_CACHE_TOKEN) {
        config.cache.token = Some(token);
    }
    if let Some(host) = env_value(ENV_HOST) {
        config.server.host = host;
    }
    if let Some(port) = env_value(ENV_PORT) {
        config.server.port = port
            .parse()
            .with_context(|| format!("{ENV_PORT} is not a valid port: {port}"))?;
    }
    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.search.max_query_length == 0 {
        anyhow::bail!("search.max_query_length must be greater than 0");
    }

    if config.search.source_timeout_secs == 0 {
        anyhow::bail!("search.source_timeout_secs must be greater than 0");
    }

    if !(1..=10).contains(&config.search.results_per_source) {
        anyhow::bail!(
            "search.results_per_source must be between 1 and 10, got {}",
            config.search.results_per_source
        );
    }

    if !(1..=MAX_CACHE_TTL_SECS).contains(&config.cache.ttl_secs) {
        anyhow::bail!(
            "cache.ttl_secs must be between 1 and {}, got {}",
            MAX_CACHE_TTL_SECS,
            config.cache.ttl_secs
        );
    }

    if config.tmdb.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        tracing::warn!("No TMDB API key configured; movie and TV search are disabled");
    }

    Ok(())
}
