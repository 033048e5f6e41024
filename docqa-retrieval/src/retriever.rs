//! Ranked similarity search over a built index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::RetrievedChunk;
use crate::error::{Result, RetrievalError};
use crate::index::{ChunkVector, DocumentIndex};
use crate::tokenizer::Tokenizer;

/// The outcome of a query against a built index.
///
/// [`Retrieval::NoRelevantContent`] is a valid result, not a failure: it
/// tells the answer boundary that nothing scored above the relevance
/// threshold, which is different from a best-effort low-quality match and
/// different from an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Retrieval {
    /// At least one chunk scored above the relevance threshold, ranked by
    /// descending similarity.
    Relevant(Vec<RetrievedChunk>),
    /// Every chunk scored at or below the relevance threshold.
    NoRelevantContent,
}

impl Retrieval {
    /// The ranked chunks, empty for [`Retrieval::NoRelevantContent`].
    pub fn chunks(&self) -> &[RetrievedChunk] {
        match self {
            Self::Relevant(results) => results,
            Self::NoRelevantContent => &[],
        }
    }

    /// Whether anything scored above the threshold.
    pub fn is_relevant(&self) -> bool {
        matches!(self, Self::Relevant(_))
    }

    /// Chunk texts in rank order joined by blank lines: the grounding
    /// context handed to the answer-generation boundary.
    pub fn context_text(&self) -> String {
        self.chunks().iter().map(|r| r.chunk.text.trim()).collect::<Vec<_>>().join("\n\n")
    }
}

/// Scores a query against every chunk vector of a built index.
///
/// The query is tokenized with the configuration embedded in the index and
/// weighted by the index's own IDF table; query terms outside the document
/// vocabulary contribute nothing. Chunks are ranked by cosine similarity,
/// descending, with ties at `score_epsilon` precision broken by ascending
/// chunk position.
#[derive(Debug, Clone)]
pub struct Retriever {
    min_score: f64,
    score_epsilon: f64,
}

impl Retriever {
    /// Create a retriever.
    ///
    /// # Arguments
    ///
    /// * `min_score` — a chunk must score strictly above this to be returned
    /// * `score_epsilon` — similarity differences at or below this are ties;
    ///   must be strictly positive
    pub fn new(min_score: f64, score_epsilon: f64) -> Self {
        Self { min_score, score_epsilon }
    }

    /// Rank the index's chunks against `query_text` and return at most
    /// `top_k` of them. `top_k` larger than the chunk count is clamped down.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidChunkConfig`] if `top_k == 0`.
    pub fn search(
        &self,
        index: &DocumentIndex,
        query_text: &str,
        top_k: usize,
    ) -> Result<Retrieval> {
        if top_k == 0 {
            return Err(RetrievalError::InvalidChunkConfig(
                "top_k must be greater than zero".to_string(),
            ));
        }

        let tokenizer = Tokenizer::new(index.tokenizer.clone());
        let query = query_vector(&tokenizer, index, query_text);
        let query_norm = norm(&query);
        if query_norm == 0.0 {
            return Ok(Retrieval::NoRelevantContent);
        }

        // index.chunks and index.vectors are position-ordered, so ranking on
        // the array index ties identically to ranking on chunk position.
        let mut scored: Vec<(usize, f64)> = index
            .vectors
            .iter()
            .enumerate()
            .map(|(i, vector)| (i, cosine_score(&query, query_norm, vector)))
            .filter(|(_, score)| *score > self.min_score)
            .collect();

        if scored.is_empty() {
            return Ok(Retrieval::NoRelevantContent);
        }

        scored.sort_unstable_by(|a, b| {
            quantize(b.1, self.score_epsilon)
                .cmp(&quantize(a.1, self.score_epsilon))
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(top_k.min(scored.len()));

        let results = scored
            .into_iter()
            .map(|(i, score)| RetrievedChunk { chunk: index.chunks[i].clone(), score })
            .collect();
        Ok(Retrieval::Relevant(results))
    }
}

/// Quantize a similarity onto the epsilon grid. Near-equal scores land on
/// the same grid point, compare equal, and fall through to the position
/// tie-break; the comparison stays a total order.
fn quantize(score: f64, epsilon: f64) -> i64 {
    (score / epsilon).round() as i64
}

/// The query's term weights: length-normalized frequency times the index's
/// IDF. Terms without an IDF entry are out of vocabulary and dropped.
fn query_vector(
    tokenizer: &Tokenizer,
    index: &DocumentIndex,
    query_text: &str,
) -> BTreeMap<String, f64> {
    let tokens = tokenizer.tokenize(query_text);
    if tokens.is_empty() {
        return BTreeMap::new();
    }

    let token_count = tokens.len() as f64;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for token in tokens {
        *counts.entry(token).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter_map(|(term, count)| {
            index.idf.get(&term).map(|idf| (term, count as f64 / token_count * idf))
        })
        .collect()
}

fn norm(vector: &BTreeMap<String, f64>) -> f64 {
    vector.values().map(|w| w * w).sum::<f64>().sqrt()
}

/// Cosine similarity between the query vector and one chunk vector.
/// Accumulates in the query's fixed term order; zero-magnitude vectors
/// score zero.
fn cosine_score(query: &BTreeMap<String, f64>, query_norm: f64, vector: &ChunkVector) -> f64 {
    if query_norm == 0.0 || vector.norm == 0.0 {
        return 0.0;
    }
    let dot: f64 = query
        .iter()
        .filter_map(|(term, weight)| vector.weights.get(term).map(|w| weight * w))
        .sum();
    dot / (query_norm * vector.norm)
}
