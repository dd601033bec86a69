//! API error handling
//!
//! Author: hephaex@gmail.com

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lumen_core::LumenError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    #[schema(example = "BAD_REQUEST")]
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn service_unavailable() -> Self {
        Self::new("SERVICE_UNAVAILABLE", "Vector store is not available")
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    ServiceUnavailable(Option<String>),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::ServiceUnavailable(details) => {
                let error = ApiError::service_unavailable();
                let error = match details {
                    Some(details) => error.with_details(details),
                    None => error,
                };
                (StatusCode::SERVICE_UNAVAILABLE, error)
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::internal_error().with_details(msg),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<LumenError> for AppError {
    fn from(err: LumenError) -> Self {
        match err {
            LumenError::NotFound(msg) => AppError::NotFound(msg),
            LumenError::InvalidArgument(msg) => AppError::BadRequest(msg),
            LumenError::NotReady => AppError::ServiceUnavailable(None),
            LumenError::Embedding(msg) => AppError::Internal(format!("Embedding error: {msg}")),
            LumenError::Chunking(msg) => AppError::Internal(format!("Chunking error: {msg}")),
            LumenError::Search(msg) => AppError::Internal(format!("Search error: {msg}")),
            LumenError::Config(msg) => AppError::Internal(format!("Configuration error: {msg}")),
            LumenError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
