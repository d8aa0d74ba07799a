//! OpenAPI documentation and Swagger UI integration.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::AppContext;

/// OpenAPI documentation for medialog.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Medialog API",
        version = "0.1.0",
        description = "Federated movie, TV, anime and book search",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Default server")
    ),
    paths(
        super::routes_search::health,
        super::routes_search::search,
    ),
    components(
        schemas(
            super::routes_search::HealthResponse,
            super::routes_search::SourceHealth,
            SearchResponseSchema,
            MediaResultSchema,
            MediaKindSchema,
            BreakdownSchema,
            ErrorSchema,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "search", description = "Federated media search"),
    )
)]
pub struct ApiDoc;

// Schema wrappers for the shared types, which carry no utoipa derive

/// Aggregated search response.
#[derive(utoipa::ToSchema)]
#[schema(as = SearchResponse)]
pub struct SearchResponseSchema {
    /// The query exactly as received
    pub query: String,
    /// Number of results
    pub total: usize,
    /// Results ordered movie, tv, anime, book
    pub results: Vec<MediaResultSchema>,
    /// Per-source result counts
    pub breakdown: BreakdownSchema,
}

/// A single search hit.
#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = MediaResult)]
pub struct MediaResultSchema {
    /// Source-prefixed id, e.g. `tmdb-27205`
    pub id: String,
    /// Display title
    pub title: String,
    /// Media kind
    #[serde(rename = "type")]
    pub kind: MediaKindSchema,
    /// Absolute cover image URL
    pub image_url: Option<String>,
    /// Release, air or publication year
    pub year: Option<i32>,
}

/// Media kind.
#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
#[schema(as = MediaKind)]
pub enum MediaKindSchema {
    Movie,
    Tv,
    Anime,
    Book,
}

/// Per-source result counts.
#[derive(utoipa::ToSchema)]
#[schema(as = SourceBreakdown)]
pub struct BreakdownSchema {
    pub movies: usize,
    pub tv: usize,
    pub anime: usize,
    pub books: usize,
}

/// Error body.
#[derive(utoipa::ToSchema)]
#[schema(as = ApiError)]
pub struct ErrorSchema {
    /// Human-readable message
    pub error: String,
    /// Machine-readable code, e.g. `invalid_query`
    pub code: String,
    /// Request id, when known
    pub request_id: Option<String>,
}

/// Swagger UI at `/docs` and the document at `/openapi.json`, nested under `/api`.
pub fn openapi_routes() -> Router<AppContext> {
    Router::new().merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}
