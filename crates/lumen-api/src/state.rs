//! Application state management
//!
//! Author: hephaex@gmail.com

use lumen_core::AppConfig;
use lumen_rag::{citation_source, DocumentLibrary, QueryRanker, RankerConfig};
use lumen_vector::{InMemoryVectorStore, VectorStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Similarity store shared by the library and the ranker
    pub store: Arc<dyn VectorStore>,
    /// Uploaded documents
    pub library: DocumentLibrary,
    /// Query ranker
    pub ranker: QueryRanker,
}

impl AppState {
    /// Create state backed by an in-memory store built from config
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(InMemoryVectorStore::from_config(&config.chunking));
        Self::with_store(config, store)
    }

    /// Create state around an existing store
    pub fn with_store(config: AppConfig, store: Arc<dyn VectorStore>) -> Self {
        let ranker_config = RankerConfig::from(&config);
        let citations = citation_source(config.search.citation_mode, ranker_config.chunk_stride);
        let ranker = QueryRanker::new(store.clone(), ranker_config).with_citations(citations);

        Self {
            library: DocumentLibrary::new(store.clone()),
            ranker,
            store,
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Initialize the vector store
    pub async fn initialize(&self) -> bool {
        self.store.initialize().await
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Ready once the vector store has initialized
    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
