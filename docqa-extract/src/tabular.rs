//! Tabular (CSV) extraction.

use csv::ReaderBuilder;

use crate::error::{ExtractError, Result};

/// Extract plain text from CSV bytes.
///
/// Cell values in a row are joined with single spaces and every row becomes
/// its own paragraph, so downstream chunking can split along row boundaries.
/// Empty cells and rows with no content are skipped. The header row is kept:
/// column names carry retrieval signal just like data cells.
pub(crate) fn extract_csv(bytes: &[u8]) -> Result<String> {
    let mut reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(bytes);

    let mut rows: Vec<String> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExtractError::CorruptInput {
            format: "csv".to_string(),
            message: e.to_string(),
        })?;
        let cells: Vec<&str> =
            record.iter().map(str::trim).filter(|cell| !cell.is_empty()).collect();
        if !cells.is_empty() {
            rows.push(cells.join(" "));
        }
    }

    Ok(rows.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_paragraphs() {
        let text = extract_csv(b"order,status\n1001,shipped\n1002,refund issued\n").unwrap();
        assert_eq!(text, "order status\n\n1001 shipped\n\n1002 refund issued");
    }

    #[test]
    fn skips_empty_cells_and_rows() {
        let text = extract_csv(b"a,,b\n,,\nc\n").unwrap();
        assert_eq!(text, "a b\n\nc");
    }

    #[test]
    fn quoted_fields_keep_their_commas() {
        let text = extract_csv(b"item,note\nwidget,\"big, heavy\"\n").unwrap();
        assert!(text.contains("big, heavy"));
    }

    #[test]
    fn invalid_utf8_is_corrupt() {
        let err = extract_csv(b"a,b\n\xff\xfe,c\n").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptInput { .. }));
    }
}
