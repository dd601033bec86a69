//! Raw similarity search handler
//!
//! Author: hephaex@gmail.com

use super::resolve_top_k;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use lumen_core::SearchHit;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Search request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Free-text query
    #[schema(example = "refund policy")]
    pub query: String,

    /// Maximum number of hits, one per document
    #[schema(example = 5)]
    pub top_k: Option<i64>,
}

/// A single vector hit
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchHitResponse {
    /// `{id}` for whole documents, `{id}_chunk_{n}` for chunks
    #[schema(example = "550e8400_chunk_2")]
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub filename: String,
    pub file_type: String,
    pub pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
    #[schema(example = 0.93)]
    pub score: f32,
}

impl From<SearchHit> for SearchHitResponse {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.id,
            document_id: hit.document_id.to_string(),
            content: hit.content,
            filename: hit.metadata.filename,
            file_type: hit.metadata.file_type.to_string(),
            pages: hit.metadata.pages,
            chunk_index: hit.metadata.chunk_index,
            score: hit.score,
        }
    }
}

/// Search response body
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHitResponse>,
    pub total: usize,
}

/// Rank stored vectors against a query
#[utoipa::path(
    post,
    path = "/api/v1/search",
    tag = "search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search completed", body = SearchResponse),
        (status = 400, description = "Invalid request", body = crate::error::ApiError)
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    if req.query.trim().is_empty() {
        return Err(AppError::BadRequest("Query cannot be empty".to_string()));
    }

    let search = &state.config.search;
    let top_k = resolve_top_k(req.top_k, search.default_top_k, search.max_top_k)?;

    let hits = state.store.search(&req.query, top_k).await?;
    let results: Vec<SearchHitResponse> = hits.into_iter().map(Into::into).collect();

    Ok(Json(SearchResponse {
        query: req.query,
        total: results.len(),
        results,
    }))
}
