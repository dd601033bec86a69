//! Lumen API - REST server
//!
//! Exposes document upload, raw similarity search and ranked querying over
//! HTTP, with health probes and a generated OpenAPI document.
//!
//! Author: hephaex@gmail.com

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Json, Router};
use lumen_core::ServerConfig;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// OpenAPI document for the public endpoints
#[derive(OpenApi)]
#[openapi(
    info(title = "Lumen API", description = "Document upload, search and query"),
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::documents::list_documents,
        handlers::documents::get_document,
        handlers::documents::upload_document,
        handlers::documents::delete_document,
        handlers::search::search_handler,
        handlers::query::query_handler,
    ),
    components(schemas(
        error::ApiError,
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
        handlers::health::ReadinessChecks,
        handlers::documents::DocumentInfo,
        handlers::documents::DocumentListResponse,
        handlers::documents::UploadDocumentRequest,
        handlers::documents::DeleteDocumentResponse,
        handlers::search::SearchRequest,
        handlers::search::SearchHitResponse,
        handlers::search::SearchResponse,
        handlers::query::QueryRequest,
        handlers::query::DocumentAnswer,
        handlers::query::QueryResponse,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "documents", description = "Document management"),
        (name = "search", description = "Raw similarity search"),
        (name = "query", description = "Ranked, cited answers")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if !config.cors_enabled {
        return CorsLayer::new();
    }

    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server);
    let body_limit = DefaultBodyLimit::max(state.config.server.max_body_size);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", routes::api_routes())
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Router over a fresh default state
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(AppState::default()))
}
