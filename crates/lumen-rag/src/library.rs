//! Document library
//!
//! Keeps the uploaded document records and feeds their text into the
//! vector store. A failed vectorization is recorded on the document, it
//! never fails the upload.
//!
//! Author: hephaex@gmail.com

use crate::CHARS_PER_PAGE;
use lumen_core::{Document, DocumentId, LumenError, Result};
use lumen_vector::VectorStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An upload request
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    /// Generated when absent
    pub id: Option<DocumentId>,

    pub filename: String,

    /// Extracted text; nothing is vectorized without it
    pub content: Option<String>,

    /// Payload size in bytes, defaults to the content length
    pub size: Option<u64>,

    /// Page count, estimated from the content when absent
    pub pages: Option<u32>,
}

impl DocumentUpload {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = Some(pages);
        self
    }
}

/// Pages needed for `char_count` characters, at least one
pub fn estimate_pages(char_count: usize) -> u32 {
    char_count.div_ceil(CHARS_PER_PAGE).max(1) as u32
}

/// Uploaded documents in upload order
pub struct DocumentLibrary {
    store: Arc<dyn VectorStore>,
    documents: RwLock<Vec<Document>>,
}

impl DocumentLibrary {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Record a document and vectorize its content
    ///
    /// Uploading an existing id replaces the earlier record in place. When
    /// the new upload is not vectorized, vectors left from the earlier
    /// upload are removed so they cannot match queries.
    pub async fn upload(&self, upload: DocumentUpload) -> Result<Document> {
        if upload.filename.trim().is_empty() {
            return Err(LumenError::InvalidArgument(
                "filename must not be empty".to_string(),
            ));
        }

        let id = upload.id.unwrap_or_else(DocumentId::generate);
        let content = upload.content.filter(|c| !c.is_empty());

        let pages = upload.pages.filter(|p| *p > 0).unwrap_or_else(|| {
            content
                .as_deref()
                .map(|c| estimate_pages(c.chars().count()))
                .unwrap_or(1)
        });
        let size = upload
            .size
            .unwrap_or_else(|| content.as_ref().map(|c| c.len() as u64).unwrap_or(0));

        let mut document = Document::new(id, upload.filename, pages).with_size(size);

        if let Some(content) = content.as_deref() {
            document.vectorized = self.store.add_document(&document, content).await;
        }
        if !document.vectorized && self.store.remove_document(&document.id).await {
            tracing::debug!(document_id = %document.id, "Dropped vectors of earlier upload");
        }

        tracing::info!(
            document_id = %document.id,
            filename = %document.filename,
            file_type = %document.file_type,
            pages = document.pages,
            vectorized = document.vectorized,
            "Document uploaded"
        );

        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document.clone(),
            None => documents.push(document.clone()),
        }

        Ok(document)
    }

    pub async fn list(&self) -> Vec<Document> {
        self.documents.read().await.clone()
    }

    pub async fn get(&self, id: &DocumentId) -> Option<Document> {
        self.documents
            .read()
            .await
            .iter()
            .find(|d| &d.id == id)
            .cloned()
    }

    /// Drop a record and its vectors
    pub async fn remove(&self, id: &DocumentId) -> Result<Document> {
        let removed = {
            let mut documents = self.documents.write().await;
            let position = documents
                .iter()
                .position(|d| &d.id == id)
                .ok_or_else(|| LumenError::NotFound(format!("Document {id}")))?;
            documents.remove(position)
        };

        self.store.remove_document(id).await;
        tracing::info!(document_id = %id, "Document removed");

        Ok(removed)
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}
