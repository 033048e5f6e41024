//! Portable-document (PDF) extraction.

use lopdf::Document;
use tracing::warn;

use crate::error::{ExtractError, Result};

/// Extract plain text from PDF bytes, page by page in page order.
///
/// A page whose text cannot be decoded, or that yields no text at all, is
/// recorded as a warning rather than failing the whole document. Page texts
/// are joined with paragraph breaks.
pub(crate) fn extract_pdf(bytes: &[u8]) -> Result<(String, Vec<String>)> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::CorruptInput {
        format: "pdf".to_string(),
        message: e.to_string(),
    })?;

    if doc.is_encrypted() {
        return Err(ExtractError::CorruptInput {
            format: "pdf".to_string(),
            message: "document is encrypted".to_string(),
        });
    }

    let mut pages_text: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let pages = doc.get_pages();
    for (&page_number, _) in &pages {
        match doc.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => pages_text.push(text),
            // Damaged pages often decode "successfully" to nothing, so an
            // empty page is reported the same way as a failed one.
            Ok(_) => {
                warn!(page = page_number, "page has no extractable text");
                warnings.push(format!("page {page_number}: no extractable text"));
            }
            Err(e) => {
                warn!(page = page_number, error = %e, "skipping unreadable page");
                warnings.push(format!("page {page_number}: {e}"));
            }
        }
    }

    Ok((pages_text.join("\n\n"), warnings))
}
