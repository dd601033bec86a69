//! Fixed-window chunking with overlap
//!
//! Offsets and lengths are measured in characters, not bytes.
//!
//! Author: hephaex@gmail.com

use lumen_core::{ChunkingConfig, DocumentId, LumenError, Result, VectorKey};

/// Configuration for document chunking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Window size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive windows in characters
    pub overlap: usize,

    /// Windows shorter than this are discarded
    pub min_chunk_size: usize,

    /// Content must be strictly longer than this to be chunked
    pub threshold: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
            min_chunk_size: 100,
            threshold: 500,
        }
    }
}

impl ChunkConfig {
    /// Distance between the starts of consecutive windows
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(LumenError::Chunking("chunk_size must be positive".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(LumenError::Chunking(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Whether content of this many characters gets chunked
    pub fn should_chunk(&self, char_count: usize) -> bool {
        char_count > self.threshold
    }
}

impl From<&ChunkingConfig> for ChunkConfig {
    fn from(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
            min_chunk_size: config.min_chunk_size,
            threshold: config.threshold,
        }
    }
}

/// A window of a parent document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Owning document
    pub parent: DocumentId,

    /// Position among retained chunks, starting at zero
    pub index: u32,

    /// Chunk content
    pub content: String,

    /// Starting character offset in the parent
    pub start_offset: usize,

    /// Ending character offset (exclusive)
    pub end_offset: usize,
}

impl TextChunk {
    pub fn key(&self) -> VectorKey {
        VectorKey::Chunk {
            parent: self.parent.clone(),
            index: self.index,
        }
    }

    /// Public identifier, `{parent}_chunk_{index}`
    pub fn id(&self) -> String {
        self.key().to_string()
    }
}

/// Split content into overlapping windows
///
/// The threshold is not consulted here; callers decide whether to chunk
/// with [`ChunkConfig::should_chunk`]. Skipped short windows do not consume
/// an index.
pub fn chunk_content(
    content: &str,
    parent: &DocumentId,
    config: &ChunkConfig,
) -> Result<Vec<TextChunk>> {
    config.validate()?;

    // byte offset of every char boundary, plus the end of the string
    let boundaries: Vec<usize> = content
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(content.len()))
        .collect();
    let char_count = boundaries.len() - 1;
    let stride = config.stride();

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < char_count {
        let end = (start + config.chunk_size).min(char_count);

        if end - start >= config.min_chunk_size {
            chunks.push(TextChunk {
                parent: parent.clone(),
                index: chunks.len() as u32,
                content: content[boundaries[start]..boundaries[end]].to_string(),
                start_offset: start,
                end_offset: end,
            });
        }

        start += stride;
    }

    Ok(chunks)
}

// ============================================================================
// Tests
// ============================================================================
