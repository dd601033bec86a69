//! Query handlers
//!
//! Author: hephaex@gmail.com

use super::resolve_top_k;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use lumen_rag::{DocumentResult, QueryOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Query request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryRequest {
    /// User's question
    #[schema(example = "How long are invoices retained?")]
    pub question: String,

    /// Maximum number of documents to answer from
    #[schema(example = 5)]
    pub top_k: Option<i64>,
}

/// Answer drawn from one document
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentAnswer {
    pub result_id: String,
    pub document_id: String,

    /// Filename, or `Document_{id prefix}` when unnamed
    #[schema(example = "handbook.txt")]
    pub document_name: String,
    pub query: String,
    pub answer: String,

    #[schema(example = "Page 1, Paragraph 2")]
    pub citation: String,
    pub page: u32,
    pub paragraph: u32,

    #[schema(example = 0.87)]
    pub score: f32,
}

impl From<DocumentResult> for DocumentAnswer {
    fn from(result: DocumentResult) -> Self {
        Self {
            citation: result.citation.to_string(),
            page: result.citation.page,
            paragraph: result.citation.paragraph,
            result_id: result.result_id,
            document_id: result.document_id.to_string(),
            document_name: result.document_name,
            query: result.query,
            answer: result.answer,
            score: result.score,
        }
    }
}

/// Query response body
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryResponse {
    pub query: String,

    /// `answered` or `no_results`
    #[schema(example = "answered")]
    pub status: String,

    pub results: Vec<DocumentAnswer>,
}

/// Rank documents for a question
#[utoipa::path(
    post,
    path = "/api/v1/query",
    tag = "query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Query completed", body = QueryResponse),
        (status = 400, description = "Invalid request", body = crate::error::ApiError),
        (status = 503, description = "Vector store unavailable", body = crate::error::ApiError)
    )
)]
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    if req.question.trim().is_empty() {
        return Err(AppError::BadRequest("Question cannot be empty".to_string()));
    }

    let search = &state.config.search;
    let top_k = resolve_top_k(req.top_k, search.default_top_k, search.max_top_k)?;

    let (status, results) = match state.ranker.rank(&req.question, Some(top_k)).await? {
        QueryOutcome::Answered(results) => ("answered", results),
        QueryOutcome::NoMatches => ("no_results", Vec::new()),
        QueryOutcome::Unavailable => {
            return Err(AppError::ServiceUnavailable(Some(
                "Vector store failed to initialize".to_string(),
            )))
        }
    };

    Ok(Json(QueryResponse {
        query: req.question,
        status: status.to_string(),
        results: results.into_iter().map(Into::into).collect(),
    }))
}
