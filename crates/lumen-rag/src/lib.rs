//! Lumen RAG - Query ranking over the vector store
//!
//! Turns similarity hits into per-document answers:
//! - one result per matching document, best first
//! - a citation label for each result from a pluggable source
//! - an explicit outcome when nothing matched or the store is unusable
//!
//! Author: hephaex@gmail.com

use lumen_core::{
    display_name, AppConfig, DocumentId, LumenError, Result, SearchConfig, SearchHit,
};
use lumen_vector::{ChunkConfig, VectorStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

pub mod citation;
pub mod library;

pub use citation::{
    citation_source, Citation, CitationSource, PlaceholderCitations, PositionalCitations,
};
pub use library::{estimate_pages, DocumentLibrary, DocumentUpload};

/// Characters assumed per page for estimates and citations
pub const CHARS_PER_PAGE: usize = 3000;

// ============================================================================
// Configuration
// ============================================================================

/// Ranker configuration
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Results returned when the caller does not ask for a count
    pub default_top_k: usize,

    /// Upper bound on a requested count
    pub max_top_k: usize,

    /// Characters between chunk starts, used for positional citations
    pub chunk_stride: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            max_top_k: 50,
            chunk_stride: ChunkConfig::default().stride(),
        }
    }
}

impl From<&SearchConfig> for RankerConfig {
    fn from(config: &SearchConfig) -> Self {
        Self {
            default_top_k: config.default_top_k,
            max_top_k: config.max_top_k,
            ..Self::default()
        }
    }
}

impl From<&AppConfig> for RankerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            chunk_stride: ChunkConfig::from(&config.chunking).stride(),
            ..Self::from(&config.search)
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Answer drawn from a single document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    /// Key of the matching vector
    pub result_id: String,
    pub document_id: DocumentId,
    pub document_name: String,
    pub query: String,

    /// Matching chunk text, or the whole document
    pub answer: String,
    pub citation: Citation,
    pub score: f32,
}

/// Result of ranking a query
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// At least one document matched, best first
    Answered(Vec<DocumentResult>),

    /// The store was searched and returned nothing
    NoMatches,

    /// The store could not be initialized
    Unavailable,
}

impl QueryOutcome {
    pub fn results(&self) -> &[DocumentResult] {
        match self {
            Self::Answered(results) => results,
            Self::NoMatches | Self::Unavailable => &[],
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered(_))
    }
}

// ============================================================================
// Query Ranker
// ============================================================================

/// Ranks stored documents against a query
pub struct QueryRanker {
    store: Arc<dyn VectorStore>,
    citations: Arc<dyn CitationSource>,
    config: RankerConfig,
}

impl QueryRanker {
    /// Create a ranker citing by position with the configured chunk stride
    pub fn new(store: Arc<dyn VectorStore>, config: RankerConfig) -> Self {
        Self {
            store,
            citations: Arc::new(PositionalCitations::new(config.chunk_stride)),
            config,
        }
    }

    /// Replace the citation source
    pub fn with_citations(mut self, citations: Arc<dyn CitationSource>) -> Self {
        self.citations = citations;
        self
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Rank documents for `query`
    ///
    /// `top_k` falls back to the configured default. An empty query, a zero
    /// count or a count above the maximum is an invalid argument.
    pub async fn rank(&self, query: &str, top_k: Option<usize>) -> Result<QueryOutcome> {
        let start_time = Instant::now();

        if query.trim().is_empty() {
            return Err(LumenError::InvalidArgument(
                "query must not be empty".to_string(),
            ));
        }

        let top_k = top_k.unwrap_or(self.config.default_top_k);
        if top_k == 0 || top_k > self.config.max_top_k {
            return Err(LumenError::InvalidArgument(format!(
                "top_k must be between 1 and {}",
                self.config.max_top_k
            )));
        }

        if !self.store.is_ready() && !self.store.initialize().await {
            tracing::warn!("Vector store unavailable, query not ranked");
            return Ok(QueryOutcome::Unavailable);
        }

        let hits = self.store.search(query, top_k).await?;
        tracing::debug!(hits = hits.len(), top_k, "Vector search returned");

        if hits.is_empty() {
            return Ok(QueryOutcome::NoMatches);
        }

        let results: Vec<DocumentResult> =
            hits.into_iter().map(|hit| self.to_result(query, hit)).collect();

        tracing::info!(
            results = results.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Query ranked"
        );

        Ok(QueryOutcome::Answered(results))
    }

    fn to_result(&self, query: &str, hit: SearchHit) -> DocumentResult {
        let citation = self.citations.cite(&hit);
        DocumentResult {
            document_name: display_name(&hit.metadata.filename, &hit.document_id),
            result_id: hit.id,
            document_id: hit.document_id,
            query: query.to_string(),
            answer: hit.content,
            citation,
            score: hit.score,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
