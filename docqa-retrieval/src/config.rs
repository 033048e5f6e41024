//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};
use crate::tokenizer::TokenizerConfig;

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Fraction of a chunk, counted back from its cut point, in which a
    /// natural boundary is preferred over a hard cut.
    pub boundary_lookback: f64,
    /// Default number of top results per query when the caller passes none.
    pub top_k: usize,
    /// A result must score strictly above this to count as relevant.
    pub min_score: f64,
    /// Similarity differences at or below this are treated as ties and
    /// broken by chunk position.
    pub score_epsilon: f64,
    /// Tokenization rules shared by the index build and query paths.
    pub tokenizer: TokenizerConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 100,
            boundary_lookback: 0.2,
            top_k: 3,
            min_score: 0.0,
            score_epsilon: 1e-9,
            tokenizer: TokenizerConfig::default(),
        }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the boundary lookback fraction.
    pub fn boundary_lookback(mut self, fraction: f64) -> Self {
        self.config.boundary_lookback = fraction;
        self
    }

    /// Set the default number of top results per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity a result must exceed.
    pub fn min_score(mut self, score: f64) -> Self {
        self.config.min_score = score;
        self
    }

    /// Set the tie-breaking epsilon for similarity comparisons.
    pub fn score_epsilon(mut self, epsilon: f64) -> Self {
        self.config.score_epsilon = epsilon;
        self
    }

    /// Set the tokenization rules.
    pub fn tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.config.tokenizer = tokenizer;
        self
    }

    /// Build the [`RetrievalConfig`], validating that parameters are
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidChunkConfig`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `boundary_lookback` is outside `[0, 1]`
    /// - `score_epsilon` is not strictly positive
    /// - `min_score` is not finite
    pub fn build(self) -> Result<RetrievalConfig> {
        let config = self.config;
        if config.chunk_size == 0 {
            return Err(RetrievalError::InvalidChunkConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(RetrievalError::InvalidChunkConfig(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.top_k == 0 {
            return Err(RetrievalError::InvalidChunkConfig(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.boundary_lookback) {
            return Err(RetrievalError::InvalidChunkConfig(format!(
                "boundary_lookback ({}) must be within [0, 1]",
                config.boundary_lookback
            )));
        }
        if !(config.score_epsilon.is_finite() && config.score_epsilon > 0.0) {
            return Err(RetrievalError::InvalidChunkConfig(format!(
                "score_epsilon ({}) must be strictly positive",
                config.score_epsilon
            )));
        }
        if !config.min_score.is_finite() {
            return Err(RetrievalError::InvalidChunkConfig(format!(
                "min_score ({}) must be finite",
                config.min_score
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        assert!(RetrievalConfig::builder().build().is_ok());
    }

    #[test]
    fn rejects_overlap_reaching_chunk_size() {
        let err = RetrievalConfig::builder().chunk_size(100).chunk_overlap(100).build();
        assert!(matches!(err, Err(RetrievalError::InvalidChunkConfig(_))));
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = RetrievalConfig::builder().top_k(0).build();
        assert!(matches!(err, Err(RetrievalError::InvalidChunkConfig(_))));
    }

    #[test]
    fn rejects_out_of_range_lookback() {
        let err = RetrievalConfig::builder().boundary_lookback(1.5).build();
        assert!(matches!(err, Err(RetrievalError::InvalidChunkConfig(_))));
    }

    #[test]
    fn rejects_non_positive_epsilon() {
        let err = RetrievalConfig::builder().score_epsilon(0.0).build();
        assert!(matches!(err, Err(RetrievalError::InvalidChunkConfig(_))));
    }
}
