//! Search and health endpoints.

use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use medialog_common::CACHE_STATUS_HEADER;
use serde::Serialize;
use utoipa::{IntoParams, ToSchema};

use super::error::AppError;
use super::openapi::{ErrorSchema, SearchResponseSchema};
use super::request_id::RequestId;
use super::AppContext;

pub fn search_routes() -> Router<AppContext> {
    Router::new().route("/search", get(search))
}

/// Query string of the search endpoint.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text query, 1 to 200 characters
    pub query: Option<String>,
}

impl SearchParams {
    /// Take the first `query` value; repeats are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let query = pairs
            .into_iter()
            .find(|(name, _)| name == "query")
            .map(|(_, value)| value);
        Self { query }
    }
}

/// Search every source for a title.
#[utoipa::path(
    get,
    path = "/search",
    tag = "search",
    params(SearchParams),
    responses(
        (status = 200, description = "Aggregated results", body = SearchResponseSchema,
            headers(("x-cache-status" = String, description = "HIT or MISS"))),
        (status = 400, description = "Missing, empty or oversized query", body = ErrorSchema),
        (status = 500, description = "Unexpected internal failure", body = ErrorSchema),
    )
)]
pub async fn search(
    State(ctx): State<AppContext>,
    request_id: Option<Extension<RequestId>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let params = SearchParams::from_pairs(pairs);
    let outcome = ctx.search.search(params.query.as_deref()).await.map_err(|e| {
        let err = AppError::new(e);
        match request_id {
            Some(Extension(RequestId(id))) => err.with_request_id(id),
            None => err,
        }
    })?;

    let headers = [(
        HeaderName::from_static(CACHE_STATUS_HEADER),
        HeaderValue::from_static(outcome.cache_status.as_str()),
    )];
    Ok((headers, Json(outcome.response)))
}

/// One registered source in the health report.
#[derive(Debug, Serialize, ToSchema)]
pub struct SourceHealth {
    /// Source identifier, e.g. `tmdb-movie`
    pub name: String,
    /// Kind of result the source emits
    pub kind: String,
    /// False when required credentials are missing
    pub available: bool,
}

/// Health report.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` when the server answers
    pub status: String,
    /// Server version
    pub version: String,
    /// Registered search sources
    pub sources: Vec<SourceHealth>,
    /// Cache backend: `upstash`, `memory` or `disabled`
    pub cache: String,
}

/// Liveness plus a summary of which sources and cache are configured.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    let sources = ctx
        .search
        .sources()
        .into_iter()
        .map(|s| SourceHealth {
            name: s.name.to_string(),
            kind: s.kind.to_string(),
            available: s.available,
        })
        .collect();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sources,
        cache: ctx.search.cache_mode().to_string(),
    })
}
