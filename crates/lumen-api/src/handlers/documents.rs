//! Document management handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use lumen_core::{Document, DocumentId};
use lumen_rag::DocumentUpload;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Document information
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentInfo {
    /// Document identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: String,

    /// Original file name
    #[schema(example = "handbook.txt")]
    pub filename: String,

    /// File type derived from the extension
    #[schema(example = "Text")]
    pub file_type: String,

    /// Page count
    #[schema(example = 3)]
    pub pages: u32,

    /// Payload size in bytes
    pub size: u64,

    /// Upload timestamp (RFC 3339)
    pub uploaded_at: String,

    /// Whether the content was embedded
    pub vectorized: bool,

    /// Number of stored chunks
    #[schema(example = 12)]
    pub chunk_count: usize,
}

impl DocumentInfo {
    async fn build(state: &AppState, document: Document) -> Self {
        let chunk_count = state.store.chunk_count(&document.id).await.unwrap_or(0);
        Self {
            id: document.id.to_string(),
            file_type: document.file_type.to_string(),
            uploaded_at: document.uploaded_at.to_rfc3339(),
            filename: document.filename,
            pages: document.pages,
            size: document.size,
            vectorized: document.vectorized,
            chunk_count,
        }
    }
}

/// Document list response
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentListResponse {
    /// List of documents
    pub documents: Vec<DocumentInfo>,

    /// Total count after filtering
    pub total: usize,

    /// Current page
    pub page: u32,

    /// Page size
    pub page_size: u32,
}

/// Query parameters for document listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDocumentsQuery {
    /// Page number (1-indexed)
    #[param(default = 1)]
    pub page: Option<u32>,

    /// Items per page
    #[param(default = 20)]
    pub page_size: Option<u32>,

    /// Filter by file type (`PDF`, `Word`, `Image`, `Text`, `Unknown`)
    pub file_type: Option<String>,
}

/// List uploaded documents in upload order
#[utoipa::path(
    get,
    path = "/api/v1/documents",
    tag = "documents",
    params(ListDocumentsQuery),
    responses(
        (status = 200, description = "Document list", body = DocumentListResponse)
    )
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListDocumentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 100);

    let documents: Vec<Document> = state
        .library
        .list()
        .await
        .into_iter()
        .filter(|d| match &params.file_type {
            Some(ft) => d.file_type.to_string().eq_ignore_ascii_case(ft),
            None => true,
        })
        .collect();
    let total = documents.len();

    let offset = (page as usize - 1).saturating_mul(page_size as usize);
    let mut infos = Vec::new();
    for document in documents.into_iter().skip(offset).take(page_size as usize) {
        infos.push(DocumentInfo::build(&state, document).await);
    }

    Ok((
        StatusCode::OK,
        Json(DocumentListResponse {
            documents: infos,
            total,
            page,
            page_size,
        }),
    ))
}

/// Get a single document
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}",
    tag = "documents",
    params(
        ("id" = String, Path, description = "Document identifier")
    ),
    responses(
        (status = 200, description = "Document found", body = DocumentInfo),
        (status = 404, description = "Document not found", body = crate::error::ApiError)
    )
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let id = DocumentId::new(id);
    let document = state
        .library
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Document {id}")))?;

    Ok((StatusCode::OK, Json(DocumentInfo::build(&state, document).await)))
}

/// Upload document request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadDocumentRequest {
    /// File name; the extension decides the file type
    #[schema(example = "handbook.txt")]
    pub filename: String,

    /// Extracted text; omitted for binary files
    pub content: Option<String>,

    /// Caller-assigned identifier, generated when absent
    pub id: Option<String>,

    /// Page count, estimated from the content when absent
    pub pages: Option<u32>,
}

/// Upload a document and vectorize its text
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    tag = "documents",
    request_body = UploadDocumentRequest,
    responses(
        (status = 201, description = "Document uploaded", body = DocumentInfo),
        (status = 400, description = "Invalid request", body = crate::error::ApiError)
    )
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    if req.filename.trim().is_empty() {
        return Err(AppError::BadRequest("Filename cannot be empty".to_string()));
    }

    let upload = DocumentUpload {
        id: req.id.filter(|id| !id.is_empty()).map(DocumentId::new),
        filename: req.filename,
        size: req.content.as_ref().map(|c| c.len() as u64),
        content: req.content,
        pages: req.pages,
    };

    let document = state.library.upload(upload).await?;
    if !document.vectorized {
        tracing::debug!(document_id = %document.id, "Uploaded without vectorization");
    }

    Ok((
        StatusCode::CREATED,
        Json(DocumentInfo::build(&state, document).await),
    ))
}

/// Delete document response
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteDocumentResponse {
    pub message: String,
    pub id: String,
}

/// Delete a document and its vectors
#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    tag = "documents",
    params(
        ("id" = String, Path, description = "Document identifier")
    ),
    responses(
        (status = 200, description = "Document deleted", body = DeleteDocumentResponse),
        (status = 404, description = "Document not found", body = crate::error::ApiError)
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let removed = state.library.remove(&DocumentId::new(id)).await?;

    Ok((
        StatusCode::OK,
        Json(DeleteDocumentResponse {
            message: format!("Document {} deleted", removed.id),
            id: removed.id.to_string(),
        }),
    ))
}
