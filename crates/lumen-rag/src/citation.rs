//! Citation labels for ranked results
//!
//! A citation is a `(page, paragraph)` pair rendered as
//! `Page {page}, Paragraph {paragraph}`. Where the pair comes from is
//! pluggable: [`PositionalCitations`] derives it from where a chunk sits in
//! its parent, [`PlaceholderCitations`] draws it from an RNG.
//!
//! Author: hephaex@gmail.com

use crate::CHARS_PER_PAGE;
use lumen_core::{CitationMode, SearchHit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Characters per paragraph assumed by positional citations
pub const CHARS_PER_PARAGRAPH: usize = 600;

/// Page and paragraph of a result, both starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub page: u32,
    pub paragraph: u32,
}

impl Citation {
    pub fn new(page: u32, paragraph: u32) -> Self {
        Self { page, paragraph }
    }
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Page {}, Paragraph {}", self.page, self.paragraph)
    }
}

/// Source of citations for search hits
pub trait CitationSource: Send + Sync {
    fn cite(&self, hit: &SearchHit) -> Citation;
}

// ============================================================================
// Positional
// ============================================================================

/// Citations derived from a chunk's character offset
///
/// Whole-document hits cite the first paragraph of the first page.
#[derive(Debug, Clone)]
pub struct PositionalCitations {
    stride: usize,
    chars_per_page: usize,
    chars_per_paragraph: usize,
}

impl PositionalCitations {
    /// `stride` is the distance between consecutive chunk starts
    pub fn new(stride: usize) -> Self {
        Self {
            stride,
            chars_per_page: CHARS_PER_PAGE,
            chars_per_paragraph: CHARS_PER_PARAGRAPH,
        }
    }

    pub fn with_layout(mut self, chars_per_page: usize, chars_per_paragraph: usize) -> Self {
        self.chars_per_page = chars_per_page.max(1);
        self.chars_per_paragraph = chars_per_paragraph.max(1);
        self
    }

    fn locate(&self, offset: usize, pages: u32) -> Citation {
        let page = (offset / self.chars_per_page + 1).min(pages.max(1) as usize);
        let within_page = offset.saturating_sub((page - 1) * self.chars_per_page);
        // offsets past the last page land on its final paragraph
        let last_paragraph = self.chars_per_page.div_ceil(self.chars_per_paragraph).max(1);
        let paragraph = (within_page / self.chars_per_paragraph + 1).min(last_paragraph);
        Citation::new(page as u32, paragraph as u32)
    }
}

impl CitationSource for PositionalCitations {
    fn cite(&self, hit: &SearchHit) -> Citation {
        match hit.key.chunk_index() {
            Some(index) => self.locate(index as usize * self.stride, hit.metadata.pages),
            None => Citation::new(1, 1),
        }
    }
}

// ============================================================================
// Placeholder
// ============================================================================

const PLACEHOLDER_MAX_PAGE: u32 = 10;
const PLACEHOLDER_MAX_PARAGRAPH: u32 = 5;

/// Random labels, page 1-10 and paragraph 1-5
pub struct PlaceholderCitations<R> {
    rng: Mutex<R>,
}

impl<R: Rng + Send> PlaceholderCitations<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl PlaceholderCitations<StdRng> {
    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> CitationSource for PlaceholderCitations<R> {
    fn cite(&self, _hit: &SearchHit) -> Citation {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        Citation::new(
            rng.gen_range(1..=PLACEHOLDER_MAX_PAGE),
            rng.gen_range(1..=PLACEHOLDER_MAX_PARAGRAPH),
        )
    }
}

/// Build the citation source for a configured mode
pub fn citation_source(mode: CitationMode, stride: usize) -> Arc<dyn CitationSource> {
    match mode {
        CitationMode::Positional => Arc::new(PositionalCitations::new(stride)),
        CitationMode::Placeholder => Arc::new(PlaceholderCitations::from_entropy()),
    }
}
