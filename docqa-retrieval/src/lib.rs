//! Lexical document retrieval for question answering.
//!
//! Uploaded documents are extracted to plain text, split into overlapping
//! chunks, and indexed per document with TF-IDF weights. Queries are scored
//! against one document's chunks by cosine similarity and the top-ranked
//! chunks come back as grounding context, with "nothing relevant" reported
//! as an explicit outcome rather than a weak best-effort match.
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
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = RetrievalPipeline::builder()
//!         .config(RetrievalConfig::default())
//!         .store(Arc::new(InMemoryIndexStore::new()))
//!         .build()?;
//!
//!     let bytes = std::fs::read("sales.csv")?;
//!     pipeline.ingest("sales", "sales.csv", &bytes, SourceFormat::Csv).await?;
//!
//!     let result = pipeline.query("sales", "What is the refund policy?", None).await?;
//!     if result.is_relevant() {
//!         println!("{}", result.context_text());
//!     }
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod retriever;
pub mod store;
pub mod tokenizer;

pub use chunking::{Chunker, TextChunker};
pub use config::{RetrievalConfig, RetrievalConfigBuilder};
pub use document::{Chunk, Document, RetrievedChunk};
pub use error::{Result, RetrievalError};
pub use index::{DocumentIndex, IndexStats};
pub use pipeline::{RetrievalPipeline, RetrievalPipelineBuilder};
pub use retriever::{Retrieval, Retriever};
pub use store::{InMemoryIndexStore, IndexStore, StoreStats};
pub use tokenizer::{Tokenizer, TokenizerConfig};

pub use docqa_extract::{ExtractError, ExtractedText, SourceFormat, extract, extract_tagged};
