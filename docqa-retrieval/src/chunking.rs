//! Splitting extracted text into ordered, overlapping chunks.
//!
//! [`TextChunker`] cuts text into spans of at most `max_size` characters
//! where consecutive spans share exactly `overlap` characters. Inside a
//! lookback window at the end of each span it prefers a paragraph break,
//! then a sentence break, then any whitespace, before falling back to a
//! hard cut. The produced sequence covers the input with no gaps: joining
//! the chunks minus their overlaps reproduces the text exactly.

use std::collections::BTreeMap;

use crate::document::Chunk;
use crate::error::{Result, RetrievalError};

/// A strategy for splitting text into chunks.
///
/// Implementations produce [`Chunk`]s with text and positions but empty
/// term-frequency vectors; those are attached at index build time.
pub trait Chunker: Send + Sync {
    /// Split `text` into an ordered chunk sequence for `document_id`.
    ///
    /// Returns an empty `Vec` when `text` is empty.
    fn chunk(&self, document_id: &str, text: &str) -> Vec<Chunk>;
}

/// Splits text by character count with exact overlap and natural-boundary
/// preference.
///
/// Sizes are in Unicode scalar values, never bytes, so a cut can never land
/// inside a multi-byte character. Chunk IDs are `{document_id}_{position}`.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_retrieval::TextChunker;
///
/// let chunker = TextChunker::new(512, 100)?;
/// let chunks = chunker.chunk("doc-1", &text);
/// ```
#[derive(Debug, Clone)]
pub struct TextChunker {
    max_size: usize,
    overlap: usize,
    lookback_fraction: f64,
}

impl TextChunker {
    /// Create a new `TextChunker`.
    ///
    /// # Arguments
    ///
    /// * `max_size` — maximum number of characters per chunk
    /// * `overlap` — number of characters consecutive chunks share
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidChunkConfig`] if `max_size == 0` or
    /// `overlap >= max_size`.
    pub fn new(max_size: usize, overlap: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(RetrievalError::InvalidChunkConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= max_size {
            return Err(RetrievalError::InvalidChunkConfig(format!(
                "overlap ({overlap}) must be less than max_size ({max_size})"
            )));
        }
        Ok(Self { max_size, overlap, lookback_fraction: 0.2 })
    }

    /// Set the fraction of `max_size`, counted back from the cut point, in
    /// which a natural boundary is preferred over a hard cut. Clamped to
    /// `[0, 1]`; `0` disables boundary preference entirely.
    pub fn with_lookback_fraction(mut self, fraction: f64) -> Self {
        self.lookback_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Pick the end of the chunk starting at `start`, given the hard cut at
    /// `hard_end`. The returned end always satisfies
    /// `start + overlap < end <= hard_end`, so the next start strictly
    /// advances and overlap stays exact.
    fn pick_end(&self, chars: &[char], start: usize, hard_end: usize) -> usize {
        let lookback = (self.max_size as f64 * self.lookback_fraction) as usize;
        let floor = hard_end.saturating_sub(lookback).max(start + self.overlap + 1);
        if floor >= hard_end {
            return hard_end;
        }

        let window = &chars[floor..hard_end];
        paragraph_break(window)
            .or_else(|| sentence_break(window))
            .or_else(|| whitespace_break(window))
            .map_or(hard_end, |offset| floor + offset)
    }
}

impl Chunker for TextChunker {
    fn chunk(&self, document_id: &str, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut position = 0;

        loop {
            let hard_end = (start + self.max_size).min(chars.len());
            let end = if hard_end == chars.len() {
                hard_end
            } else {
                self.pick_end(&chars, start, hard_end)
            };

            chunks.push(Chunk {
                id: format!("{document_id}_{position}"),
                document_id: document_id.to_string(),
                position,
                text: chars[start..end].iter().collect(),
                term_frequencies: BTreeMap::new(),
            });

            if end == chars.len() {
                break;
            }
            position += 1;
            start = end - self.overlap;
        }

        chunks
    }
}

/// Latest position just past a `\n\n` pair in `window`, if any.
fn paragraph_break(window: &[char]) -> Option<usize> {
    (0..window.len().saturating_sub(1))
        .rev()
        .find(|&i| window[i] == '\n' && window[i + 1] == '\n')
        .map(|i| i + 2)
}

/// Latest position just past sentence punctuation followed by whitespace.
fn sentence_break(window: &[char]) -> Option<usize> {
    (0..window.len().saturating_sub(1))
        .rev()
        .find(|&i| matches!(window[i], '.' | '!' | '?') && window[i + 1].is_whitespace())
        .map(|i| i + 2)
}

/// Latest position just past any whitespace character.
fn whitespace_break(window: &[char]) -> Option<usize> {
    (0..window.len()).rev().find(|&i| window[i].is_whitespace()).map(|i| i + 1)
}
