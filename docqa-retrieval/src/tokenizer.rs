//! Shared tokenization for the index build and query paths.
//!
//! Build and query must split text identically or every score silently
//! degrades, so there is exactly one tokenizer implementation and a built
//! index embeds the [`TokenizerConfig`] it was created with.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Common English function words that carry no retrieval signal.
///
/// Words shorter than the default minimum token length are omitted; the
/// length filter already removes them.
const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "has", "have", "had", "not", "but", "with", "you",
    "your", "this", "that", "these", "those", "from", "they", "them", "their", "what", "which",
    "who", "whom", "how", "when", "where", "why", "can", "could", "should", "would", "will",
    "shall", "may", "might", "must", "been", "being", "does", "did", "doing", "its", "any", "all",
    "each", "more", "most", "other", "some", "such", "than", "then", "too", "very", "into", "out",
    "about", "over", "under", "again",
];

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is a valid regex"));

/// Rules for turning text into index terms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenizerConfig {
    /// Minimum token length in characters; shorter tokens are dropped.
    pub min_token_chars: usize,
    /// Tokens removed after case folding.
    pub stop_words: BTreeSet<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_token_chars: 3,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| (*w).to_string()).collect(),
        }
    }
}

impl TokenizerConfig {
    /// Replace the stop-word list, lowercasing every entry.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = words.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
        self
    }

    /// Set the minimum token length in characters.
    pub fn with_min_token_chars(mut self, min: usize) -> Self {
        self.min_token_chars = min;
        self
    }
}

/// Splits text into terms: Unicode word-character runs, case-folded, then
/// filtered by length and stop list.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Create a tokenizer from a configuration.
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    /// Tokenize `text` into index terms, in occurrence order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        WORD_PATTERN
            .find_iter(text)
            .map(|word| word.as_str().to_lowercase())
            .filter(|token| token.chars().count() >= self.config.min_token_chars)
            .filter(|token| !self.config.stop_words.contains(token))
            .collect()
    }

    /// The configuration this tokenizer applies.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(TokenizerConfig::default())
    }

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        assert_eq!(tokenizer().tokenize("Refund POLICY: see page-four."), vec![
            "refund", "policy", "see", "page", "four"
        ]);
    }

    #[test]
    fn drops_short_tokens_and_stop_words() {
        assert_eq!(tokenizer().tokenize("it is the refund"), vec!["refund"]);
    }

    #[test]
    fn keeps_numbers_and_accented_words() {
        assert_eq!(tokenizer().tokenize("pedido 1002 reembolsar Ação"), vec![
            "pedido", "1002", "reembolsar", "ação"
        ]);
    }

    #[test]
    fn custom_stop_words_are_case_folded() {
        let config = TokenizerConfig::default().with_stop_words(["Refund"]);
        assert_eq!(Tokenizer::new(config).tokenize("refund approved"), vec!["approved"]);
    }

    #[test]
    fn minimum_token_length_is_configurable() {
        let tokenizer = Tokenizer::new(TokenizerConfig::default().with_min_token_chars(2));

        assert_eq!(tokenizer.config().min_token_chars, 2);
        assert_eq!(tokenizer.tokenize("ox cart"), vec!["ox", "cart"]);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(tokenizer().tokenize("  \n\t ").is_empty());
    }
}
