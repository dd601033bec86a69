//! Lumen Core - Domain models, errors, and shared types
//!
//! This crate defines the core abstractions used throughout Lumen:
//! - Document records and file type classification
//! - Vector keys shared by documents and their chunks
//! - Search hits returned by similarity search
//! - Common error types
//! - Configuration management and logging setup
//!
//! Author: hephaex@gmail.com

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, ChunkingConfig, CitationMode, ConfigError, LoggingConfig, SearchConfig,
    ServerConfig,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Lumen operations
#[derive(Error, Debug)]
pub enum LumenError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Chunking error: {0}")]
    Chunking(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Store is not ready")]
    NotReady,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LumenError>;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of an uploaded document
///
/// Caller-assigned or generated. Any string is accepted; chunk identity is
/// carried by [`VectorKey`] rather than by a marker inside this string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix used when a document has no usable name
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Key of a stored vector: either a whole document or one of its chunks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VectorKey {
    Document(DocumentId),
    Chunk { parent: DocumentId, index: u32 },
}

impl VectorKey {
    /// Document that owns this vector
    pub fn document_id(&self) -> &DocumentId {
        match self {
            Self::Document(id) => id,
            Self::Chunk { parent, .. } => parent,
        }
    }

    pub fn chunk_index(&self) -> Option<u32> {
        match self {
            Self::Document(_) => None,
            Self::Chunk { index, .. } => Some(*index),
        }
    }

    pub fn is_chunk(&self) -> bool {
        matches!(self, Self::Chunk { .. })
    }
}

impl std::fmt::Display for VectorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document(id) => write!(f, "{id}"),
            Self::Chunk { parent, index } => write!(f, "{parent}_chunk_{index}"),
        }
    }
}

// ============================================================================
// Document Models
// ============================================================================

/// Coarse file classification derived from the file extension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "PDF")]
    Pdf,
    Word,
    Image,
    Text,
    #[default]
    Unknown,
}

impl FileType {
    /// Classify by extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "doc" | "docx" => Self::Word,
            "jpg" | "jpeg" | "png" => Self::Image,
            "txt" | "md" => Self::Text,
            _ => Self::Unknown,
        }
    }

    /// Classify by the extension of a file name or path
    pub fn from_filename(filename: &str) -> Self {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Whether raw bytes of this type are readable as text without parsing
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "PDF"),
            Self::Word => write!(f, "Word"),
            Self::Image => write!(f, "Image"),
            Self::Text => write!(f, "Text"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Metadata carried alongside stored vectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub filename: String,
    pub file_type: FileType,
    pub pages: u32,
}

/// An uploaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Original file name
    pub filename: String,

    /// Classification from the file extension
    pub file_type: FileType,

    /// Page count
    pub pages: u32,

    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,

    /// Payload size in bytes
    pub size: u64,

    /// Whether the content was embedded into the vector store
    pub vectorized: bool,
}

impl Document {
    /// Create a new, not yet vectorized, document record
    pub fn new(id: DocumentId, filename: impl Into<String>, pages: u32) -> Self {
        let filename = filename.into();
        Self {
            id,
            file_type: FileType::from_filename(&filename),
            filename,
            pages,
            uploaded_at: Utc::now(),
            size: 0,
            vectorized: false,
        }
    }

    /// Set payload size
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            filename: self.filename.clone(),
            file_type: self.file_type,
            pages: self.pages,
        }
    }

    /// Name shown to users: the filename, or a short id-based fallback
    pub fn display_name(&self) -> String {
        display_name(&self.filename, &self.id)
    }
}

/// Filename if present, else `Document_{first 8 chars of id}`
pub fn display_name(filename: &str, id: &DocumentId) -> String {
    if filename.trim().is_empty() {
        format!("Document_{}", id.short())
    } else {
        filename.to_string()
    }
}

// ============================================================================
// Search Types
// ============================================================================

/// Metadata attached to a search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitMetadata {
    pub filename: String,
    pub file_type: FileType,
    pub pages: u32,

    /// Set when the hit is a chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
}

impl HitMetadata {
    pub fn new(metadata: &DocumentMetadata, chunk_index: Option<u32>) -> Self {
        Self {
            filename: metadata.filename.clone(),
            file_type: metadata.file_type,
            pages: metadata.pages,
            chunk_index,
        }
    }
}

/// A single similarity search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Rendered key (`{id}` or `{id}_chunk_{n}`)
    pub id: String,

    pub key: VectorKey,

    /// Owning document
    pub document_id: DocumentId,

    /// Chunk text or full document text
    pub content: String,

    pub metadata: HitMetadata,

    /// Cosine similarity with the query
    pub score: f32,
}

// ============================================================================
// Tests
// ============================================================================
