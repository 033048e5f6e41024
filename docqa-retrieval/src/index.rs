//! Per-document TF-IDF index build.
//!
//! The index treats each chunk as one document of its own small corpus:
//! term weights combine a length-normalized term frequency with a smoothed
//! inverse document frequency computed across the chunk collection,
//!
//! `idf(t) = ln((1 + N) / (1 + df(t))) + 1`
//!
//! where `N` is the chunk count and `df(t)` the number of chunks containing
//! `t`. The index is derived data: fully reconstructible from the chunk
//! sequence, cached by document identifier, never a source of truth.
//!
//! All sparse vectors are `BTreeMap`s, so sums accumulate in a fixed term
//! order and rebuilding from the same chunks is bit-for-bit identical.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::Chunk;
use crate::error::{Result, RetrievalError};
use crate::tokenizer::{Tokenizer, TokenizerConfig};

/// A built TF-IDF index over one document's chunk sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentIndex {
    /// The owning document's identifier.
    pub document_id: String,
    /// Tokenizer configuration the index was built with. Queries against
    /// this index reuse it, so build and query paths can never diverge.
    pub tokenizer: TokenizerConfig,
    /// Smoothed inverse document frequency per term.
    pub idf: BTreeMap<String, f64>,
    /// One weighted term vector per chunk, in chunk position order.
    pub vectors: Vec<ChunkVector>,
    /// The indexed chunks in position order, term frequencies attached.
    pub chunks: Vec<Chunk>,
    /// Total number of tokens across all chunks.
    pub token_count: usize,
    /// When the index was built.
    pub built_at: DateTime<Utc>,
}

/// The weighted term vector for one chunk, with its precomputed norm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkVector {
    /// Position of the chunk this vector scores.
    pub position: usize,
    /// Sparse `term → tf × idf` weights.
    pub weights: BTreeMap<String, f64>,
    /// Euclidean norm of `weights`, precomputed at build time.
    pub norm: f64,
}

/// Summary statistics for one built index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexStats {
    /// The owning document's identifier.
    pub document_id: String,
    /// Number of indexed chunks.
    pub chunk_count: usize,
    /// Number of distinct terms.
    pub vocabulary_size: usize,
    /// Total number of tokens across all chunks.
    pub token_count: usize,
    /// When the index was built.
    pub built_at: DateTime<Utc>,
}

impl DocumentIndex {
    /// Build the index for a document's chunk sequence.
    ///
    /// Chunks are indexed in position order regardless of the order they
    /// arrive in, and each chunk gets its normalized term frequencies
    /// attached. Building twice from the same chunks yields identical
    /// weights.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::EmptyDocument`] if `chunks` is empty.
    pub fn build(
        document_id: impl Into<String>,
        chunks: Vec<Chunk>,
        tokenizer_config: TokenizerConfig,
    ) -> Result<Self> {
        let document_id = document_id.into();
        if chunks.is_empty() {
            return Err(RetrievalError::EmptyDocument { document_id });
        }

        let mut chunks = chunks;
        chunks.sort_by_key(|chunk| chunk.position);

        let tokenizer = Tokenizer::new(tokenizer_config.clone());
        let total_chunks = chunks.len() as f64;

        let mut per_chunk: Vec<(usize, BTreeMap<String, usize>)> = Vec::with_capacity(chunks.len());
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut token_count = 0;

        for chunk in &chunks {
            let tokens = tokenizer.tokenize(&chunk.text);
            let chunk_tokens = tokens.len();
            token_count += chunk_tokens;

            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for token in tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            for term in counts.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            per_chunk.push((chunk_tokens, counts));
        }

        let idf: BTreeMap<String, f64> = document_frequency
            .into_iter()
            .map(|(term, df)| {
                let value = ((1.0 + total_chunks) / (1.0 + df as f64)).ln() + 1.0;
                (term, value)
            })
            .collect();

        let mut vectors: Vec<ChunkVector> = Vec::with_capacity(chunks.len());
        for (chunk, (chunk_tokens, counts)) in chunks.iter_mut().zip(per_chunk) {
            let mut frequencies: BTreeMap<String, f64> = BTreeMap::new();
            let mut weights: BTreeMap<String, f64> = BTreeMap::new();
            for (term, count) in counts {
                let tf = count as f64 / chunk_tokens as f64;
                let weight = tf * idf.get(&term).copied().unwrap_or_default();
                frequencies.insert(term.clone(), tf);
                weights.insert(term, weight);
            }
            let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
            chunk.term_frequencies = frequencies;
            vectors.push(ChunkVector { position: chunk.position, weights, norm });
        }

        debug!(
            document.id = %document_id,
            chunk_count = chunks.len(),
            vocabulary_size = idf.len(),
            "built lexical index"
        );

        Ok(Self {
            document_id,
            tokenizer: tokenizer_config,
            idf,
            vectors,
            chunks,
            token_count,
            built_at: Utc::now(),
        })
    }

    /// Summary statistics for the status surface.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            document_id: self.document_id.clone(),
            chunk_count: self.chunks.len(),
            vocabulary_size: self.idf.len(),
            token_count: self.token_count,
            built_at: self.built_at,
        }
    }

    /// Serialize to an opaque blob suitable for caching or persistence.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::SerializationError`] if encoding fails.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| RetrievalError::SerializationError(e.to_string()))
    }

    /// Reconstruct an index from a blob produced by [`to_blob`].
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::SerializationError`] if decoding fails or
    /// the decoded vectors and chunks disagree in count or position.
    pub fn from_blob(bytes: &[u8]) -> Result<Self> {
        let index: Self = serde_json::from_slice(bytes)
            .map_err(|e| RetrievalError::SerializationError(e.to_string()))?;

        // The retriever ranks by array index, which only works while both
        // sequences stay aligned and in position order.
        if index.vectors.len() != index.chunks.len() {
            return Err(RetrievalError::SerializationError(format!(
                "blob holds {} vectors for {} chunks",
                index.vectors.len(),
                index.chunks.len()
            )));
        }
        let aligned = index
            .vectors
            .iter()
            .zip(&index.chunks)
            .all(|(vector, chunk)| vector.position == chunk.position);
        let ordered = index.chunks.windows(2).all(|pair| pair[0].position <= pair[1].position);
        if !aligned || !ordered {
            return Err(RetrievalError::SerializationError(
                "blob chunk positions are out of order".to_string(),
            ));
        }
        Ok(index)
    }
}
