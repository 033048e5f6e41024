//! Data types for documents, chunks, and retrieval results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ingested source document and its ordered chunk sequence.
///
/// A document is created once per successful upload and extraction; a
/// re-upload of the same logical file gets a fresh identifier instead of
/// mutating an existing document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Stable identifier assigned by the caller's persistence layer.
    pub id: String,
    /// The original filename as uploaded.
    pub filename: String,
    /// When the text was extracted.
    pub extracted_at: DateTime<Utc>,
    /// The full extracted text.
    pub text: String,
    /// The ordered chunk sequence produced from `text`.
    pub chunks: Vec<Chunk>,
}

/// A bounded contiguous span of a document's text, the atomic retrieval unit.
///
/// Chunks are immutable once indexed. `position` defines sequence order and
/// is the deterministic tie-breaker when ranked scores are equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{document_id}_{position}`.
    pub id: String,
    /// The ID of the owning [`Document`].
    pub document_id: String,
    /// Zero-based position in the document's chunk sequence.
    pub position: usize,
    /// The text span covered by this chunk.
    pub text: String,
    /// Length-normalized term frequencies for `text`, attached at index
    /// build time. Empty until then.
    pub term_frequencies: BTreeMap<String, f64>,
}

/// A retrieved [`Chunk`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query, in `[0, 1]`.
    pub score: f64,
}
