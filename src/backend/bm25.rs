//! In-memory BM25 sparse backend.
//!
//! Indexes a fixed document set once at construction and answers lexical
//! queries with BM25 (optionally BM25+). Useful for small corpora, tests and
//! hosts that have no external full-text engine.
//!
//! # Algorithm
//!
//! ```ascii
//! Standard BM25:
//! score = Σ IDF(q) × f(q,D)×(k1+1) / (f(q,D) + k1×(1-b+b×|D|/avgdl))
//!
//! BM25+ (when delta > 0):
//! score = Σ IDF(q) × (f(q,D)×(k1+1) / (f(q,D) + k1×(1-b+b×|D|/avgdl)) + delta)
//!
//! IDF(q) = ln((N - n(q) + 0.5) / (n(q) + 0.5) + 1)
//! ```
//!
//! Tags are indexed alongside the body text.
//!
//! # References
//!
//! - Robertson, S., Zaragoza, H. (2009). The Probabilistic Relevance Framework
//! - Lv, Y., Zhai, C. (2011). Lower-Bounding Term Frequency Normalization (BM25+)

use async_trait::async_trait;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;

use super::traits::{SearchBackend, SparseBackend};
use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::types::{Document, DocumentId, RankedList};

/// BM25 scoring and analysis parameters.
///
/// # Presets
///
/// | Preset | k1 | b | delta | Stemming |
/// |--------|----|----|-------|----------|
/// | `new()` | 1.5 | 0.75 | 0 | none |
/// | `for_short_docs()` | 1.2 | 0.3 | 0 | English |
/// | `for_long_docs()` | 1.5 | 0.75 | 1.0 | English |
#[derive(Debug, Clone)]
pub struct Bm25Config {
    /// Term frequency saturation.
    pub k1: f64,
    /// Length normalization. 0 = none, 1 = full.
    pub b: f64,
    /// BM25+ lower bound for matching terms.
    pub delta: f64,
    /// Snowball stemmer applied after tokenization.
    pub stemmer: Option<Algorithm>,
    /// Tokenizer shared with the rest of the crate.
    pub tokenizer: Tokenizer,
}

impl Bm25Config {
    /// Standard BM25 (k1=1.5, b=0.75), no stemming.
    pub fn new() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            delta: 0.0,
            stemmer: None,
            tokenizer: Tokenizer::new(),
        }
    }

    /// Preset for short documents (headlines, company blurbs).
    pub fn for_short_docs() -> Self {
        Self {
            k1: 1.2,
            b: 0.3,
            stemmer: Some(Algorithm::English),
            ..Self::new()
        }
    }

    /// Preset for long documents (filings, articles), BM25+.
    pub fn for_long_docs() -> Self {
        Self {
            delta: 1.0,
            stemmer: Some(Algorithm::English),
            ..Self::new()
        }
    }

    /// Set k1 and b, clamped to sane ranges.
    pub fn with_params(mut self, k1: f64, b: f64) -> Self {
        self.k1 = k1.clamp(0.0, 3.0);
        self.b = b.clamp(0.0, 1.0);
        self
    }

    /// Enable a stemmer.
    pub fn with_stemmer(mut self, algorithm: Algorithm) -> Self {
        self.stemmer = Some(algorithm);
        self
    }

    /// Use a custom tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenizer.tokenize(text);
        match self.stemmer {
            Some(algorithm) => {
                let stemmer = Stemmer::create(algorithm);
                tokens
                    .into_iter()
                    .map(|t| stemmer.stem(&t).to_string())
                    .collect()
            }
            None => tokens,
        }
    }
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable in-memory BM25 index implementing [`SparseBackend`].
///
/// # Example
///
/// ```
/// use aurora_retrieval::{Bm25Backend, Document};
///
/// let backend = Bm25Backend::new(vec![
///     Document::new("a", "ExampleAI closes funding round"),
///     Document::new("b", "OtherCo quarterly earnings"),
/// ]);
/// assert_eq!(backend.len(), 2);
/// ```
#[derive(Debug)]
pub struct Bm25Backend {
    name: String,
    config: Bm25Config,
    documents: Vec<Document>,
    by_id: HashMap<DocumentId, usize>,
    term_freqs: Vec<HashMap<String, usize>>,
    doc_lengths: Vec<usize>,
    doc_freqs: HashMap<String, usize>,
    avgdl: f64,
}

impl Bm25Backend {
    /// Index `documents` with [`Bm25Config::new`].
    pub fn new(documents: Vec<Document>) -> Self {
        Self::with_config(documents, Bm25Config::new())
    }

    /// Index `documents` with a custom configuration.
    ///
    /// When IDs repeat, the first document wins.
    pub fn with_config(documents: Vec<Document>, config: Bm25Config) -> Self {
        let mut by_id = HashMap::new();
        let mut kept = Vec::with_capacity(documents.len());
        for doc in documents {
            if by_id.contains_key(&doc.id) {
                continue;
            }
            by_id.insert(doc.id.clone(), kept.len());
            kept.push(doc);
        }

        let mut term_freqs = Vec::with_capacity(kept.len());
        let mut doc_lengths = Vec::with_capacity(kept.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();

        for doc in &kept {
            let mut terms = config.analyze(&doc.text);
            for tag in &doc.tags {
                terms.extend(config.analyze(tag));
            }

            let mut tf: HashMap<String, usize> = HashMap::new();
            for term in &terms {
                *tf.entry(term.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }

            doc_lengths.push(terms.len());
            term_freqs.push(tf);
        }

        let total_length: usize = doc_lengths.iter().sum();
        let avgdl = (total_length as f64 / kept.len().max(1) as f64).max(1.0);

        Self {
            name: "bm25".to_string(),
            config,
            documents: kept,
            by_id,
            term_freqs,
            doc_lengths,
            doc_freqs,
            avgdl,
        }
    }

    /// Rename the backend (used in diagnostics).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[inline]
    fn idf(&self, term: &str) -> f64 {
        let n = self.documents.len() as f64;
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, query_terms: &[String], doc_idx: usize) -> f64 {
        let tf_map = &self.term_freqs[doc_idx];
        let doc_len = self.doc_lengths[doc_idx] as f64;
        let length_norm = 1.0 - self.config.b + self.config.b * (doc_len / self.avgdl);

        query_terms
            .iter()
            .filter_map(|term| tf_map.get(term).map(|&tf| (term, tf as f64)))
            .map(|(term, tf)| {
                let tf_component =
                    (tf * (self.config.k1 + 1.0)) / (tf + self.config.k1 * length_norm);
                self.idf(term) * (tf_component + self.config.delta)
            })
            .sum()
    }

    /// Score every document, best first, dropping non-matches.
    pub fn scored(&self, query: &str) -> Vec<(DocumentId, f64)> {
        let query_terms = self.config.analyze(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = (0..self.documents.len())
            .map(|idx| (idx, self.score(&query_terms, idx)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // Stable: equal scores keep corpus order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .map(|(idx, score)| (self.documents[idx].id.clone(), score))
            .collect()
    }
}

#[async_trait]
impl SearchBackend for Bm25Backend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str, k: usize) -> Result<RankedList> {
        Ok(self
            .scored(query)
            .into_iter()
            .take(k)
            .map(|(id, _)| id)
            .collect())
    }

    async fn hydrate(&self, ids: &[DocumentId]) -> Result<HashMap<DocumentId, Document>> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.by_id
                    .get(id)
                    .map(|&idx| (id.clone(), self.documents[idx].clone()))
            })
            .collect())
    }
}

impl SparseBackend for Bm25Backend {}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("208", "The Peugeot 208 is a compact car."),
            Document::new("2008", "The Peugeot 2008 is an SUV."),
            Document::new("3008", "The Peugeot 3008 is a larger SUV."),
        ]
    }

    #[tokio::test]
    async fn test_exact_number_precision() {
        let backend = Bm25Backend::new(corpus());
        let results = backend.search("2008", 10).await.unwrap();
        assert_eq!(results, vec!["2008"]);
    }

    #[tokio::test]
    async fn test_idf_prefers_rare_terms() {
        let backend = Bm25Backend::new(corpus());
        let results = backend.search("peugeot compact", 10).await.unwrap();
        assert_eq!(results[0], "208");
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_search_respects_k_and_empty_query() {
        let backend = Bm25Backend::new(corpus());
        assert_eq!(backend.search("peugeot", 2).await.unwrap().len(), 2);
        assert!(backend.search("the of", 10).await.unwrap().is_empty());
        assert!(backend.search("peugeot", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tags_are_searchable() {
        let backend = Bm25Backend::new(vec![
            Document::new("a", "Quarterly report").with_tags(["fintech"]),
            Document::new("b", "Quarterly report"),
        ]);
        assert_eq!(backend.search("fintech", 10).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_stemming_matches_inflections() {
        let docs = vec![Document::new("a", "ExampleAI is hiring engineers")];
        let plain = Bm25Backend::new(docs.clone());
        let stemmed = Bm25Backend::with_config(docs, Bm25Config::for_short_docs());

        assert!(plain.search("hire engineer", 5).await.unwrap().is_empty());
        assert_eq!(stemmed.search("hire engineer", 5).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_hydrate_and_duplicate_ids() {
        let backend = Bm25Backend::new(vec![
            Document::new("a", "first"),
            Document::new("a", "second"),
        ]);
        assert_eq!(backend.len(), 1);

        let docs = backend
            .hydrate(&["a".to_string(), "zz".to_string()])
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs["a"].text, "first");
    }

    #[test]
    fn test_equal_scores_keep_corpus_order() {
        let backend = Bm25Backend::new(vec![
            Document::new("x", "alpha"),
            Document::new("y", "alpha"),
            Document::new("z", "alpha"),
        ]);
        let ids: Vec<_> = backend.scored("alpha").into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }
}
