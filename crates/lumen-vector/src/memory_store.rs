//! In-memory implementation for vector storage
//!
//! Holds one embedding per document plus one per retained chunk and
//! answers queries by brute-force cosine ranking. Writers are serialized and
//! readers run concurrently through a read-write lock; every fallible step
//! of an insert happens before the write lock is taken, so a failed insert
//! never leaves partial state behind.
//!
//! Author: hephaex@gmail.com

use crate::chunker::{chunk_content, ChunkConfig, TextChunk};
use crate::embedding::{EmbeddingClient, HashEmbedding, EMBEDDING_DIMENSION};
use crate::similarity::cosine_similarity;
use crate::{StoreStats, VectorStore};
use async_trait::async_trait;
use lumen_core::{
    ChunkingConfig, Document, DocumentId, DocumentMetadata, HitMetadata, LumenError, Result,
    SearchHit, VectorKey,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A stored document with its chunks
#[derive(Debug, Clone)]
struct DocumentEntry {
    content: String,
    metadata: DocumentMetadata,
    chunks: Vec<TextChunk>,
}

/// One embedding keyed by document or chunk
#[derive(Debug, Clone)]
struct StoredVector {
    key: VectorKey,
    embedding: Vec<f32>,
}

#[derive(Debug, Default)]
struct StoreState {
    documents: HashMap<DocumentId, DocumentEntry>,
    /// Insertion order; ties in similarity keep this order
    vectors: Vec<StoredVector>,
}

impl StoreState {
    fn remove(&mut self, document_id: &DocumentId) -> bool {
        self.vectors.retain(|v| v.key.document_id() != document_id);
        self.documents.remove(document_id).is_some()
    }
}

/// In-memory vector store
pub struct InMemoryVectorStore {
    embedder: Arc<dyn EmbeddingClient>,
    chunk_config: ChunkConfig,
    state: RwLock<StoreState>,
    ready: AtomicBool,
}

impl InMemoryVectorStore {
    /// Create a store with the hash embedding and default chunking
    pub fn new() -> Self {
        Self::with_embedder(Arc::new(HashEmbedding::new()), ChunkConfig::default())
    }

    /// Create a store with the hash embedding and configured chunking
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::with_embedder(Arc::new(HashEmbedding::new()), ChunkConfig::from(config))
    }

    /// Create a store around any embedding backend
    pub fn with_embedder(embedder: Arc<dyn EmbeddingClient>, chunk_config: ChunkConfig) -> Self {
        Self {
            embedder,
            chunk_config,
            state: RwLock::new(StoreState::default()),
            ready: AtomicBool::new(false),
        }
    }

    pub fn chunk_config(&self) -> &ChunkConfig {
        &self.chunk_config
    }

    /// Full text of a stored document
    pub async fn content(&self, document_id: &DocumentId) -> Option<String> {
        self.state
            .read()
            .await
            .documents
            .get(document_id)
            .map(|entry| entry.content.clone())
    }

    /// Drop every document and vector
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.documents.clear();
        state.vectors.clear();
        tracing::info!("Vector store cleared");
    }

    async fn ensure_ready(&self) -> bool {
        self.is_ready() || self.initialize().await
    }

    /// Compute everything an insert needs without touching shared state
    async fn prepare(
        &self,
        document: &Document,
        content: &str,
    ) -> Result<(DocumentEntry, Vec<StoredVector>)> {
        let document_embedding = self.embedder.embed(content).await?;
        check_embedding(&document_embedding)?;

        let char_count = content.chars().count();
        let chunks = if self.chunk_config.should_chunk(char_count) {
            chunk_content(content, &document.id, &self.chunk_config)?
        } else {
            Vec::new()
        };

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let chunk_embeddings = self.embedder.embed_batch(&texts).await?;
        if chunk_embeddings.len() != chunks.len() {
            return Err(LumenError::Embedding(format!(
                "Expected {} chunk embeddings, got {}",
                chunks.len(),
                chunk_embeddings.len()
            )));
        }

        let mut vectors = Vec::with_capacity(chunks.len() + 1);
        for (chunk, embedding) in chunks.iter().zip(chunk_embeddings) {
            check_embedding(&embedding)?;
            vectors.push(StoredVector {
                key: chunk.key(),
                embedding,
            });
        }
        vectors.push(StoredVector {
            key: VectorKey::Document(document.id.clone()),
            embedding: document_embedding,
        });

        let entry = DocumentEntry {
            content: content.to_string(),
            metadata: document.metadata(),
            chunks,
        };

        Ok((entry, vectors))
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject embeddings of the wrong length or with NaN/infinite components
fn check_embedding(embedding: &[f32]) -> Result<()> {
    if embedding.len() != EMBEDDING_DIMENSION {
        return Err(LumenError::Embedding(format!(
            "Expected {EMBEDDING_DIMENSION} dimensions, got {}",
            embedding.len()
        )));
    }
    if let Some(position) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(LumenError::Embedding(format!(
            "Non-finite value at dimension {position}"
        )));
    }
    Ok(())
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn initialize(&self) -> bool {
        match self.embedder.warm_up().await {
            Ok(()) => {
                self.ready.store(true, AtomicOrdering::SeqCst);
                tracing::info!(
                    dimension = self.embedder.dimension(),
                    "Vector store initialized"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to initialize vector store");
                false
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.ready.load(AtomicOrdering::SeqCst)
    }

    async fn add_document(&self, document: &Document, content: &str) -> bool {
        if !self.ensure_ready().await {
            return false;
        }

        let (entry, vectors) = match self.prepare(document, content).await {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!(
                    document_id = %document.id,
                    error = %e,
                    "Failed to vectorize document"
                );
                return false;
            }
        };

        let chunk_count = entry.chunks.len();
        let mut state = self.state.write().await;
        let replaced = state.remove(&document.id);
        state.vectors.extend(vectors);
        state.documents.insert(document.id.clone(), entry);
        drop(state);

        tracing::info!(
            document_id = %document.id,
            chunks = chunk_count,
            replaced,
            "Document vectorized"
        );
        true
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        if limit == 0 {
            return Err(LumenError::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }

        if !self.ensure_ready().await {
            return Ok(Vec::new());
        }

        let query_embedding = match self
            .embedder
            .embed(query)
            .await
            .and_then(|embedding| check_embedding(&embedding).map(|_| embedding))
        {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to embed query");
                return Ok(Vec::new());
            }
        };

        let state = self.state.read().await;

        let mut scored: Vec<(usize, f32)> = state
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(&query_embedding, &v.embedding)))
            .collect();

        // sort_by is stable, so equal scores keep insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut seen: HashSet<&DocumentId> = HashSet::new();
        let mut hits = Vec::with_capacity(limit.min(scored.len()));

        for (i, score) in scored {
            if hits.len() >= limit {
                break;
            }

            let key = &state.vectors[i].key;
            let document_id = key.document_id();
            if seen.contains(document_id) {
                continue;
            }

            let Some(entry) = state.documents.get(document_id) else {
                continue;
            };

            let content = match key {
                VectorKey::Document(_) => entry.content.clone(),
                VectorKey::Chunk { index, .. } => match entry.chunks.get(*index as usize) {
                    Some(chunk) => chunk.content.clone(),
                    None => continue,
                },
            };

            seen.insert(document_id);
            hits.push(SearchHit {
                id: key.to_string(),
                key: key.clone(),
                document_id: document_id.clone(),
                content,
                metadata: HitMetadata::new(&entry.metadata, key.chunk_index()),
                score,
            });
        }

        tracing::debug!(
            scored = state.vectors.len(),
            returned = hits.len(),
            "Vector search completed"
        );

        Ok(hits)
    }

    async fn remove_document(&self, document_id: &DocumentId) -> bool {
        let removed = self.state.write().await.remove(document_id);
        if removed {
            tracing::info!(document_id = %document_id, "Document removed from vector store");
        }
        removed
    }

    async fn chunk_count(&self, document_id: &DocumentId) -> Option<usize> {
        self.state
            .read()
            .await
            .documents
            .get(document_id)
            .map(|entry| entry.chunks.len())
    }

    async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        StoreStats {
            documents: state.documents.len(),
            chunks: state.documents.values().map(|e| e.chunks.len()).sum(),
            vectors: state.vectors.len(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT_TEXT: &str = "Quarterly revenue grew fastest in northern offices";

    fn long_text(len: usize) -> String {
        "The quick brown fox jumps over the lazy dog. "
            .chars()
            .cycle()
            .take(len)
            .collect()
    }

    fn doc(id: &str, filename: &str) -> Document {
        Document::new(DocumentId::new(id), filename, 1)
    }

    /// Fails for any text containing the marker
    struct FailingEmbedding {
        marker: &'static str,
    }

    #[async_trait]
    impl EmbeddingClient for FailingEmbedding {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains(self.marker) {
                return Err(LumenError::Embedding("backend rejected input".to_string()));
            }
            HashEmbedding::new().embed(text).await
        }

        fn dimension(&self) -> usize {
            EMBEDDING_DIMENSION
        }
    }

    struct UnavailableEmbedding;

    #[async_trait]
    impl EmbeddingClient for UnavailableEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(LumenError::NotReady)
        }

        fn dimension(&self) -> usize {
            EMBEDDING_DIMENSION
        }

        async fn warm_up(&self) -> Result<()> {
            Err(LumenError::Embedding("model missing".to_string()))
        }
    }

    struct NarrowEmbedding;

    #[async_trait]
    impl EmbeddingClient for NarrowEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0; 8])
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    /// Emits NaN components for texts containing `marker`
    struct NanEmbedding {
        marker: &'static str,
    }

    #[async_trait]
    impl EmbeddingClient for NanEmbedding {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains(self.marker) {
                return Ok(vec![f32::NAN; EMBEDDING_DIMENSION]);
            }
            HashEmbedding::new().embed(text).await
        }

        fn dimension(&self) -> usize {
            EMBEDDING_DIMENSION
        }
    }

    #[tokio::test]
    async fn test_short_document_has_single_vector() {
        let store = InMemoryVectorStore::new();
        assert!(store.add_document(&doc("b", "b.txt"), SHORT_TEXT).await);

        let stats = store.stats().await;
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.chunks, 0);
        assert_eq!(stats.vectors, 1);
        assert_eq!(store.chunk_count(&DocumentId::new("b")).await, Some(0));
    }

    #[tokio::test]
    async fn test_long_document_is_chunked() {
        let store = InMemoryVectorStore::new();
        assert!(store.add_document(&doc("a", "a.txt"), &long_text(1200)).await);

        // windows start at 0, 400, 800
        assert_eq!(store.chunk_count(&DocumentId::new("a")).await, Some(3));
        assert_eq!(store.stats().await.vectors, 4);
    }

    #[tokio::test]
    async fn test_lazy_initialization() {
        let store = InMemoryVectorStore::new();
        assert!(!store.is_ready());
        assert!(store.add_document(&doc("a", "a.txt"), "text").await);
        assert!(store.is_ready());
    }

    #[tokio::test]
    async fn test_exact_match_scores_one() {
        let store = InMemoryVectorStore::new();
        store.add_document(&doc("a", "a.txt"), &long_text(1200)).await;
        store.add_document(&doc("b", "b.txt"), SHORT_TEXT).await;

        let hits = store.search(SHORT_TEXT, 5).await.unwrap();
        assert_eq!(hits[0].document_id.as_str(), "b");
        assert_eq!(hits[0].id, "b");
        assert!((hits[0].score - 1.0).abs() < 1e-5);
        assert_eq!(hits[0].content, SHORT_TEXT);
        assert_eq!(hits[0].metadata.chunk_index, None);
    }

    #[tokio::test]
    async fn test_chunk_prefix_query_hits_chunk() {
        let store = InMemoryVectorStore::new();
        let a = long_text(1200);
        store.add_document(&doc("a", "a.txt"), &a).await;
        store.add_document(&doc("b", "b.txt"), SHORT_TEXT).await;

        let prefix: String = a.chars().take(500).collect();
        let hits = store.search(&prefix, 5).await.unwrap();

        assert_eq!(hits[0].document_id.as_str(), "a");
        assert!(hits[0].key.is_chunk());
        assert_eq!(hits[0].id, "a_chunk_0");
        assert_eq!(hits[0].metadata.chunk_index, Some(0));
        assert_eq!(hits[0].content, prefix);
    }

    #[tokio::test]
    async fn test_one_hit_per_document_and_limit() {
        let store = InMemoryVectorStore::new();
        for i in 0..4 {
            let content = format!("{} variant {i}", long_text(1000));
            store
                .add_document(&doc(&format!("d{i}"), "d.txt"), &content)
                .await;
        }

        let hits = store.search(&long_text(450), 3).await.unwrap();
        assert_eq!(hits.len(), 3);

        let unique: HashSet<_> = hits.iter().map(|h| h.document_id.clone()).collect();
        assert_eq!(unique.len(), hits.len());

        let all = store.search(&long_text(450), 50).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_equal_scores_keep_insertion_order() {
        let store = InMemoryVectorStore::new();
        store.add_document(&doc("first", "1.txt"), SHORT_TEXT).await;
        store.add_document(&doc("second", "2.txt"), SHORT_TEXT).await;

        let hits = store.search("unrelated", 2).await.unwrap();
        assert_eq!(hits[0].document_id.as_str(), "first");
        assert_eq!(hits[1].document_id.as_str(), "second");
    }

    #[tokio::test]
    async fn test_zero_limit_is_invalid() {
        let store = InMemoryVectorStore::new();
        let err = store.search("anything", 0).await.unwrap_err();
        assert!(matches!(err, LumenError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let store = InMemoryVectorStore::new();
        assert!(store.search("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_scores_zero() {
        let store = InMemoryVectorStore::new();
        store.add_document(&doc("b", "b.txt"), SHORT_TEXT).await;

        let hits = store.search("", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 0.0);
    }

    #[tokio::test]
    async fn test_readding_replaces_chunks() {
        let store = InMemoryVectorStore::new();
        let id = DocumentId::new("a");
        store.add_document(&doc("a", "a.txt"), &long_text(1200)).await;
        store.add_document(&doc("a", "a.txt"), SHORT_TEXT).await;

        assert_eq!(store.chunk_count(&id).await, Some(0));
        assert_eq!(store.stats().await.vectors, 1);
        assert_eq!(store.content(&id).await.as_deref(), Some(SHORT_TEXT));
    }

    #[tokio::test]
    async fn test_remove_document_drops_chunks() {
        let store = InMemoryVectorStore::new();
        let id = DocumentId::new("a");
        store.add_document(&doc("a", "a.txt"), &long_text(1200)).await;
        store.add_document(&doc("b", "b.txt"), SHORT_TEXT).await;

        assert!(store.remove_document(&id).await);
        assert!(!store.remove_document(&id).await);

        let stats = store.stats().await;
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.vectors, 1);
        let hits = store.search(&long_text(500), 5).await.unwrap();
        assert!(hits.iter().all(|h| h.document_id.as_str() == "b"));
    }

    #[tokio::test]
    async fn test_failed_ingestion_leaves_store_untouched() {
        let store = InMemoryVectorStore::with_embedder(
            Arc::new(FailingEmbedding { marker: "POISON" }),
            ChunkConfig::default(),
        );
        assert!(store.add_document(&doc("good", "g.txt"), SHORT_TEXT).await);

        let mut bad = long_text(1200);
        bad.push_str("POISON");
        assert!(!store.add_document(&doc("bad", "b.txt"), &bad).await);

        let stats = store.stats().await;
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.vectors, 1);
        assert_eq!(store.chunk_count(&DocumentId::new("bad")).await, None);
        assert_eq!(store.search(SHORT_TEXT, 5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_initialization_failure() {
        let store =
            InMemoryVectorStore::with_embedder(Arc::new(UnavailableEmbedding), ChunkConfig::default());

        assert!(!store.initialize().await);
        assert!(!store.is_ready());
        assert!(!store.add_document(&doc("a", "a.txt"), "text").await);
        assert!(store.search("text", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_dimension_rejected() {
        let store =
            InMemoryVectorStore::with_embedder(Arc::new(NarrowEmbedding), ChunkConfig::default());
        assert!(!store.add_document(&doc("a", "a.txt"), "text").await);
        assert_eq!(store.stats().await, StoreStats::default());
    }

    #[tokio::test]
    async fn test_non_finite_embedding_rejected() {
        let store = InMemoryVectorStore::with_embedder(
            Arc::new(NanEmbedding { marker: "nan" }),
            ChunkConfig::default(),
        );

        assert!(!store.add_document(&doc("a", "a.txt"), "a nan document").await);
        assert_eq!(store.stats().await, StoreStats::default());

        assert!(store.add_document(&doc("b", "b.txt"), SHORT_TEXT).await);
        // a NaN query embedding must not outrank real scores
        assert!(store.search("nan query", 5).await.unwrap().is_empty());
        let hits = store.search(SHORT_TEXT, 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryVectorStore::new();
        store.add_document(&doc("a", "a.txt"), &long_text(1200)).await;
        store.clear().await;
        assert_eq!(store.stats().await, StoreStats::default());
    }
}
