//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::{documents, query, search};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Document endpoints
        .route(
            "/documents",
            get(documents::list_documents).post(documents::upload_document),
        )
        .route(
            "/documents/:id",
            get(documents::get_document).delete(documents::delete_document),
        )
        // Retrieval endpoints
        .route("/search", post(search::search_handler))
        .route("/query", post(query::query_handler))
}
