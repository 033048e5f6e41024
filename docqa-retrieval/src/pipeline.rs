//! End-to-end retrieval pipeline: extract, chunk, index, query.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use docqa_retrieval::{
//!     InMemoryIndexStore, RetrievalConfig, RetrievalPipeline, SourceFormat,
//! };
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .config(RetrievalConfig::default())
//!     .store(Arc::new(InMemoryIndexStore::new()))
//!     .build()?;
//!
//! pipeline.ingest("sales", "sales.csv", csv_bytes, SourceFormat::Csv).await?;
//! let result = pipeline.query("sales", "What is the refund policy?", None).await?;
//! println!("{}", result.context_text());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use docqa_extract::SourceFormat;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::chunking::{Chunker, TextChunker};
use crate::config::RetrievalConfig;
use crate::document::{Chunk, Document};
use crate::error::{Result, RetrievalError};
use crate::index::DocumentIndex;
use crate::retriever::{Retrieval, Retriever};
use crate::store::IndexStore;

/// Orchestrates the document question-answering flow: raw bytes in, ranked
/// grounding context out.
///
/// Queries run concurrently against immutable index snapshots. Index builds
/// for the same document are serialized so the last publish wins whole; a
/// failed build leaves the previously published index untouched.
pub struct RetrievalPipeline {
    config: RetrievalConfig,
    chunker: Arc<dyn Chunker>,
    store: Arc<dyn IndexStore>,
    retriever: Retriever,
    build_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for RetrievalPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalPipeline")
            .field("config", &self.config)
            .field("retriever", &self.retriever)
            .finish_non_exhaustive()
    }
}

impl RetrievalPipeline {
    /// Create a builder for configuring the pipeline.
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// Ingest an uploaded document: extract text from `bytes` for `format`,
    /// chunk it, build the index, and publish it to the store.
    ///
    /// # Errors
    ///
    /// Returns an extraction error for unsupported, corrupt, or empty input,
    /// or [`RetrievalError::EmptyDocument`] if the text yields no chunks.
    pub async fn ingest(
        &self,
        document_id: impl Into<String>,
        filename: impl Into<String>,
        bytes: &[u8],
        format: SourceFormat,
    ) -> Result<Document> {
        let document_id = document_id.into();
        let extracted = docqa_extract::extract(bytes, format)?;
        for warning in &extracted.warnings {
            warn!(document.id = %document_id, warning = %warning, "partial extraction");
        }
        debug!(
            document.id = %document_id,
            format = %format,
            chars = extracted.text.chars().count(),
            "extracted document text"
        );
        self.index_text(document_id, filename, extracted.text).await
    }

    /// Like [`RetrievalPipeline::ingest`] but resolving the format from a
    /// tag such as a file extension or MIME type.
    pub async fn ingest_tagged(
        &self,
        document_id: impl Into<String>,
        filename: impl Into<String>,
        bytes: &[u8],
        format_tag: &str,
    ) -> Result<Document> {
        let format = SourceFormat::from_tag(format_tag)?;
        self.ingest(document_id, filename, bytes, format).await
    }

    /// Index already-extracted text, bypassing format decoding. The previous
    /// index for the document, if any, is replaced atomically.
    pub async fn index_text(
        &self,
        document_id: impl Into<String>,
        filename: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Document> {
        let document_id = document_id.into();
        let filename = filename.into();
        let text = text.into();
        let extracted_at = Utc::now();

        let chunks = self.chunker.chunk(&document_id, &text);
        let index = self.build_index(&document_id, chunks).await?;

        info!(
            document.id = %document_id,
            chunk_count = index.chunks.len(),
            "ingested document"
        );

        Ok(Document {
            id: document_id,
            filename,
            extracted_at,
            text,
            chunks: index.chunks.clone(),
        })
    }

    /// Rank the document's chunks against `query_text` and return the top
    /// `top_k` (the configured default when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::IndexNotBuilt`] if the document has no
    /// published index, or [`RetrievalError::InvalidChunkConfig`] if
    /// `top_k` is zero.
    pub async fn query(
        &self,
        document_id: &str,
        query_text: &str,
        top_k: Option<usize>,
    ) -> Result<Retrieval> {
        let Some(index) = self.store.get(document_id).await? else {
            error!(document.id = %document_id, "query against unindexed document");
            return Err(RetrievalError::IndexNotBuilt { document_id: document_id.to_string() });
        };

        let top_k = top_k.unwrap_or(self.config.top_k);
        let result = self.retriever.search(&index, query_text, top_k)?;
        match &result {
            Retrieval::Relevant(chunks) => {
                info!(
                    document.id = %document_id,
                    result_count = chunks.len(),
                    "query completed"
                );
            }
            Retrieval::NoRelevantContent => {
                info!(document.id = %document_id, "query found no relevant content");
            }
        }
        Ok(result)
    }

    /// Drop a document's index. Returns `false` if none was stored.
    pub async fn remove_document(&self, document_id: &str) -> Result<bool> {
        let removed = self.store.remove(document_id).await?;
        let mut locks = self.build_locks.lock().await;
        // A build in flight still holds this entry; evicting it would let the
        // next build run on a fresh lock alongside the current one.
        if locks.get(document_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(document_id);
        }
        drop(locks);

        if removed {
            info!(document.id = %document_id, "removed document index");
        }
        Ok(removed)
    }

    /// The pipeline's configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// The index store backing the pipeline.
    pub fn store(&self) -> &Arc<dyn IndexStore> {
        &self.store
    }

    /// Build and publish the index for one document. The per-document lock
    /// serializes concurrent builds; publishing swaps the stored index in a
    /// single `put`, so readers never see a partial index.
    async fn build_index(
        &self,
        document_id: &str,
        chunks: Vec<Chunk>,
    ) -> Result<Arc<DocumentIndex>> {
        let lock = self.build_lock(document_id).await;
        let _guard = lock.lock().await;

        let index = Arc::new(DocumentIndex::build(
            document_id,
            chunks,
            self.config.tokenizer.clone(),
        )?);

        if let Err(error) = self.store.put(Arc::clone(&index)).await {
            error!(document.id = %document_id, error = %error, "failed to publish index");
            return Err(error);
        }
        debug!(
            document.id = %document_id,
            vocabulary_size = index.idf.len(),
            "published document index"
        );
        Ok(index)
    }

    async fn build_lock(&self, document_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.build_locks.lock().await;
        Arc::clone(locks.entry(document_id.to_string()).or_default())
    }
}

/// Builder for [`RetrievalPipeline`].
#[derive(Default)]
pub struct RetrievalPipelineBuilder {
    config: Option<RetrievalConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    store: Option<Arc<dyn IndexStore>>,
}

impl RetrievalPipelineBuilder {
    /// Set the retrieval configuration (required).
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the chunker. Defaults to a [`TextChunker`] built from the
    /// configured chunk size, overlap, and boundary lookback.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the index store (required).
    pub fn store(mut self, store: Arc<dyn IndexStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidChunkConfig`] if a required
    /// component is missing or the chunking parameters are invalid.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let config = self
            .config
            .ok_or_else(|| RetrievalError::InvalidChunkConfig("config is required".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| RetrievalError::InvalidChunkConfig("store is required".to_string()))?;
        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(
                TextChunker::new(config.chunk_size, config.chunk_overlap)?
                    .with_lookback_fraction(config.boundary_lookback),
            ),
        };
        let retriever = Retriever::new(config.min_score, config.score_epsilon);

        Ok(RetrievalPipeline {
            config,
            chunker,
            store,
            retriever,
            build_locks: Mutex::new(HashMap::new()),
        })
    }
}
