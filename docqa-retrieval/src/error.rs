//! Error types for the `docqa-retrieval` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Chunking or query parameters are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidChunkConfig(String),

    /// The document produced no chunks to index.
    #[error("Document '{document_id}' has no chunks to index")]
    EmptyDocument {
        /// The document whose chunk sequence was empty.
        document_id: String,
    },

    /// A query arrived for a document whose index has not been published.
    #[error("No index built for document '{document_id}'")]
    IndexNotBuilt {
        /// The document the query was addressed to.
        document_id: String,
    },

    /// An error occurred in the index store backend.
    #[error("Index store error ({backend}): {message}")]
    StoreError {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The index blob could not be encoded or decoded.
    #[error("Index serialization error: {0}")]
    SerializationError(String),

    /// An error propagated from text extraction.
    #[error(transparent)]
    ExtractError(#[from] docqa_extract::ExtractError),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;
