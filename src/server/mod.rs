use crate::config::Config;
use crate::search::SearchService;
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::get,
    Router,
};
use medialog_common::CACHE_STATUS_HEADER;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod openapi;
pub mod request_id;
pub mod routes_search;

pub use error::AppError;
pub use request_id::{RequestId, X_REQUEST_ID};

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub search: Arc<SearchService>,
}

impl AppContext {
    /// Build the context, wiring the search service from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let search = SearchService::from_config(config)?;
        Ok(Self {
            search: Arc::new(search),
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, X_REQUEST_ID.clone()])
        .expose_headers([
            HeaderName::from_static(CACHE_STATUS_HEADER),
            X_REQUEST_ID.clone(),
        ]);

    Router::new()
        // Health check
        .route("/health", get(routes_search::health))
        // Search at the root and under /api
        .merge(routes_search::search_routes())
        .nest("/api", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .with_state(ctx)
}

fn api_routes() -> Router<AppContext> {
    routes_search::search_routes()
        .route("/health", get(routes_search::health))
        // OpenAPI documentation (Swagger UI at /api/docs)
        .merge(openapi::openapi_routes())
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::from_config(&config)?;
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
