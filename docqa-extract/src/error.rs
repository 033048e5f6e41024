//! Error types for the `docqa-extract` crate.

use thiserror::Error;

/// Errors that can occur while extracting text from an uploaded file.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The declared format tag is not one this crate can handle.
    #[error("Unsupported format: {tag}")]
    UnsupportedFormat {
        /// The format tag as declared by the caller.
        tag: String,
    },

    /// The input bytes could not be parsed as the declared format.
    #[error("Corrupt input ({format}): {message}")]
    CorruptInput {
        /// The format the bytes were declared as.
        format: String,
        /// A description of the parse failure.
        message: String,
    },

    /// Extraction succeeded structurally but yielded no usable text.
    #[error("No extractable text content")]
    EmptyContent,
}

/// A convenience result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
