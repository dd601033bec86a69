//! Embedding client for generating vector representations
//!
//! `HashEmbedding` is a deterministic stand-in for a real model: it folds
//! character codes into a fixed number of slots and normalizes the result.
//! It is order- and length-sensitive but carries no semantic meaning.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use lumen_core::Result;

/// Dimension of every stored embedding
pub const EMBEDDING_DIMENSION: usize = 128;

/// Divisor applied to each character code before accumulation
const CHAR_SCALE: f64 = 100.0;

// ============================================================================
// Embedding Trait
// ============================================================================

/// Trait for embedding generation
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Get embedding dimension
    fn dimension(&self) -> usize;

    /// Load whatever the backend needs before the first call
    async fn warm_up(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Hash Embedding
// ============================================================================

/// Character-code hash embedding
#[derive(Debug, Clone, Copy, Default)]
pub struct HashEmbedding;

impl HashEmbedding {
    pub fn new() -> Self {
        Self
    }

    /// Compute the embedding synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut accumulator = [0.0f64; EMBEDDING_DIMENSION];

        for (i, ch) in text.chars().enumerate() {
            accumulator[i % EMBEDDING_DIMENSION] += f64::from(u32::from(ch)) / CHAR_SCALE;
        }

        let magnitude = accumulator.iter().map(|v| v * v).sum::<f64>().sqrt();
        if magnitude == 0.0 {
            return vec![0.0; EMBEDDING_DIMENSION];
        }

        accumulator
            .iter()
            .map(|v| (v / magnitude) as f32)
            .collect()
    }
}

#[async_trait]
impl EmbeddingClient for HashEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}

// ============================================================================
// Tests
// ============================================================================
