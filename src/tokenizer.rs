//! Text normalization into comparable tokens.
//!
//! Shared by the token reranker, the entity detector and the in-memory BM25
//! backend so that all three agree on what a "word" is.
//!
//! # Pipeline
//!
//! ```ascii
//! "Société Générale, Q3-2024!"
//!        │ lowercase + NFKD, drop combining marks
//!        ▼
//! "societe generale, q3-2024!"
//!        │ split on runs of non-alphanumerics
//!        ▼
//! [societe, generale, q3, 2024]
//!        │ remove stoplist
//!        ▼
//! [societe, generale, q3, 2024]
//! ```

use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

/// Function words dropped by default.
pub const DEFAULT_STOPLIST: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "to", "in", "on", "for",
];

/// Tokenizer with a configurable stoplist.
///
/// # Example
///
/// ```
/// use aurora_retrieval::Tokenizer;
///
/// let tokenizer = Tokenizer::new();
/// assert_eq!(tokenizer.tokenize("The state of AI, 2024"), vec!["state", "ai", "2024"]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stoplist: HashSet<String>,
}

impl Tokenizer {
    /// Create a tokenizer with [`DEFAULT_STOPLIST`].
    pub fn new() -> Self {
        Self::with_stoplist(DEFAULT_STOPLIST.iter().copied())
    }

    /// Create a tokenizer with a custom stoplist. Entries are lowercased.
    pub fn with_stoplist<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stoplist: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether `token` is removed by this tokenizer.
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stoplist.contains(token)
    }

    /// Tokenize `text`, preserving order and repetitions.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        normalize(text)
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty() && !self.is_stop_word(t))
            .map(str::to_string)
            .collect()
    }

    /// Token multiset of `text`.
    pub fn term_counts(&self, text: &str) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for token in self.tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct tokens of `text`.
    pub fn token_set(&self, text: &str) -> HashSet<String> {
        self.tokenize(text).into_iter().collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenize with the default stoplist.
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::new().tokenize(text)
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfkd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}
