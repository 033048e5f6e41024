//! Plain-text extraction from uploaded documents.
//!
//! This crate converts raw uploaded bytes into normalized plain text ready
//! for chunking and indexing. It handles three declared formats: CSV,
//! PDF, and plain UTF-8 text. Extraction is pure computation over the input
//! bytes: this crate performs no filesystem or network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_extract::{extract, SourceFormat};
//!
//! let format: SourceFormat = "csv".parse()?;
//! let extracted = extract(&upload_bytes, format)?;
//! println!("{}", extracted.text);
//! ```

pub mod clean;
pub mod error;
pub mod format;

mod pdf;
mod tabular;

use serde::{Deserialize, Serialize};

pub use crate::clean::normalize;
pub use crate::error::{ExtractError, Result};
pub use crate::format::SourceFormat;

/// Plain text produced by [`extract`], with any warnings recovered on the way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedText {
    /// The normalized extracted text.
    pub text: String,
    /// Human-readable notes about content that was skipped, such as an
    /// unreadable PDF page. Empty when extraction was clean.
    pub warnings: Vec<String>,
}

/// Extract plain text from raw uploaded bytes.
///
/// The returned text is whitespace-normalized (see [`normalize`]) and keeps
/// the source's logical structure as paragraph breaks: one paragraph per row
/// for tabular input, one per page for portable documents.
///
/// # Errors
///
/// - [`ExtractError::CorruptInput`] if the bytes cannot be read as `format`
/// - [`ExtractError::EmptyContent`] if no usable text remains after
///   extraction and normalization
pub fn extract(bytes: &[u8], format: SourceFormat) -> Result<ExtractedText> {
    let (raw, warnings) = match format {
        SourceFormat::Csv => (tabular::extract_csv(bytes)?, Vec::new()),
        SourceFormat::Pdf => pdf::extract_pdf(bytes)?,
        SourceFormat::Text => (decode_utf8(bytes)?, Vec::new()),
    };

    let text = normalize(&raw);
    if text.is_empty() {
        return Err(ExtractError::EmptyContent);
    }

    Ok(ExtractedText { text, warnings })
}

/// Parse a declared format tag and extract in one step.
///
/// # Errors
///
/// Returns [`ExtractError::UnsupportedFormat`] for an unrecognized tag, plus
/// everything [`extract`] can return.
pub fn extract_tagged(bytes: &[u8], tag: &str) -> Result<ExtractedText> {
    extract(bytes, SourceFormat::from_tag(tag)?)
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes).map(str::to_string).map_err(|e| ExtractError::CorruptInput {
        format: "txt".to_string(),
        message: e.to_string(),
    })
}
