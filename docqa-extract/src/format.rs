//! Declared source formats for uploaded files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// The declared format of an uploaded file.
///
/// The upload layer declares a format tag alongside the raw bytes; the
/// extractor dispatches on the declaration and never sniffs content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Comma-separated tabular data.
    Csv,
    /// Portable document format.
    Pdf,
    /// Plain UTF-8 text.
    Text,
}

impl SourceFormat {
    /// Parse a declared format tag.
    ///
    /// Accepts bare extensions (`"csv"`, `"pdf"`, `"txt"`), extensions with
    /// a leading dot, and the common MIME types, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnsupportedFormat`] for any other tag.
    pub fn from_tag(tag: &str) -> Result<Self, ExtractError> {
        let normalized = tag.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "csv" | "text/csv" => Ok(Self::Csv),
            "pdf" | "application/pdf" => Ok(Self::Pdf),
            "txt" | "text" | "text/plain" => Ok(Self::Text),
            _ => Err(ExtractError::UnsupportedFormat { tag: tag.to_string() }),
        }
    }
}

impl FromStr for SourceFormat {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Text => "txt",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_extensions_dots_and_mime_types() {
        assert_eq!(SourceFormat::from_tag("csv").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_tag(".PDF").unwrap(), SourceFormat::Pdf);
        assert_eq!(SourceFormat::from_tag("text/plain").unwrap(), SourceFormat::Text);
        assert_eq!("application/pdf".parse::<SourceFormat>().unwrap(), SourceFormat::Pdf);
    }

    #[test]
    fn rejects_unknown_tags() {
        let err = SourceFormat::from_tag("docx").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat { ref tag } if tag == "docx"));
    }
}
