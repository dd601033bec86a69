//! Lumen Vector - Embedding and similarity search
//!
//! Provides the embedding seam, fixed-window chunking, cosine similarity
//! and an in-memory vector store for document and chunk embeddings.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use lumen_core::{Document, DocumentId, Result, SearchHit};
use serde::Serialize;

pub mod chunker;
pub mod embedding;
pub mod memory_store;
pub mod similarity;

pub use chunker::{chunk_content, ChunkConfig, TextChunk};
pub use embedding::{EmbeddingClient, HashEmbedding, EMBEDDING_DIMENSION};
pub use memory_store::InMemoryVectorStore;
pub use similarity::cosine_similarity;

/// Counts of what a store currently holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub documents: usize,
    pub chunks: usize,
    pub vectors: usize,
}

/// Trait for vector store operations
///
/// Ingestion failures are reported as `false`, never as errors; only
/// argument misuse surfaces through `Result`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Prepare the embedding backend; `false` means the store is unusable
    async fn initialize(&self) -> bool;

    /// Whether initialization has completed
    fn is_ready(&self) -> bool;

    /// Embed and store a document (and its chunks when long enough)
    async fn add_document(&self, document: &Document, content: &str) -> bool;

    /// Rank stored vectors against a query, at most one hit per document
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// Delete a document and every chunk it owns
    async fn remove_document(&self, document_id: &DocumentId) -> bool;

    /// Number of chunks stored for a document, `None` if unknown
    async fn chunk_count(&self, document_id: &DocumentId) -> Option<usize>;

    async fn stats(&self) -> StoreStats;
}
