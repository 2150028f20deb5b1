//! Token overlap reranker.
//!
//! A fast, backend-free reranker: documents are ordered by how many query
//! tokens they share, with tag tokens boosted and an optional IDF weight.
//!
//! # Algorithm
//!
//! ```ascii
//! Query:   "ExampleAI funding funding"   Q = {exampleai:1, funding:2}
//! Doc:     "ExampleAI funding round"     D = {exampleai:1, funding:1, round:1}
//! Tags:    ["funding"]                   D[funding] += 1.5 (tag boost)
//!
//! score = Σ_{t ∈ Q} min(Q[t], D[t]) × idf(t)
//!       = min(1,1)×1 + min(2,2.5)×1 = 3.0
//! ```
//!
//! # Ordering
//!
//! - Positive scores first, descending; ties keep input order.
//! - Zero-score documents only pad the result up to `top_k`, in input order.
//! - A query with no tokens returns the first `top_k` documents unchanged.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::idf::{IdfSource, UniformIdf};
use super::result::ScoredDocument;
use super::traits::Reranker;
use crate::tokenizer::Tokenizer;
use crate::types::Document;

/// Default weight of a tag token relative to a body token.
pub const DEFAULT_TAG_BOOST: f64 = 1.5;

/// Token overlap reranker.
///
/// # Example
///
/// ```
/// use aurora_retrieval::{Document, Reranker, TokenReranker};
///
/// let reranker = TokenReranker::new();
/// let docs = vec![
///     Document::new("1", "alpha beta"),
///     Document::new("2", "gamma delta"),
/// ];
/// let top = reranker.rerank("alpha", &docs, 1);
/// assert_eq!(top[0].id, "1");
/// ```
#[derive(Debug, Clone)]
pub struct TokenReranker {
    tokenizer: Tokenizer,
    tag_boost: f64,
    idf: Arc<dyn IdfSource>,
}

impl TokenReranker {
    /// Default tokenizer, tag boost 1.5, uniform IDF.
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            tag_boost: DEFAULT_TAG_BOOST,
            idf: Arc::new(UniformIdf),
        }
    }

    /// Use a custom tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Set the tag boost. Negative or non-finite values fall back to 0.
    pub fn with_tag_boost(mut self, boost: f64) -> Self {
        self.tag_boost = if boost.is_finite() { boost.max(0.0) } else { 0.0 };
        self
    }

    /// Use corpus statistics for token weights.
    pub fn with_idf(mut self, idf: Arc<dyn IdfSource>) -> Self {
        self.idf = idf;
        self
    }

    /// The configured tag boost.
    pub fn tag_boost(&self) -> f64 {
        self.tag_boost
    }

    /// Query token multiset, ordered so scores sum in a fixed order.
    fn query_counts(&self, query: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for token in self.tokenizer.tokenize(query) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    /// Weighted document token multiset (body tokens 1.0, tag tokens boosted).
    fn document_counts(&self, doc: &Document) -> HashMap<String, f64> {
        let mut counts: HashMap<String, f64> = HashMap::new();
        for token in self.tokenizer.tokenize(&doc.text) {
            *counts.entry(token).or_insert(0.0) += 1.0;
        }
        for tag in &doc.tags {
            for token in self.tokenizer.tokenize(tag) {
                *counts.entry(token).or_insert(0.0) += self.tag_boost;
            }
        }
        counts
    }

    fn score_counts(&self, query: &BTreeMap<String, usize>, doc: &Document) -> f64 {
        let doc_counts = self.document_counts(doc);
        query
            .iter()
            .filter_map(|(token, &q)| {
                doc_counts
                    .get(token)
                    .map(|&d| (q as f64).min(d) * self.idf.idf(token))
            })
            .sum()
    }

    /// Score a single document against `query`.
    pub fn score(&self, query: &str, doc: &Document) -> f64 {
        self.score_counts(&self.query_counts(query), doc)
    }
}

impl Default for TokenReranker {
    fn default() -> Self {
        Self::new()
    }
}

impl Reranker for TokenReranker {
    fn name(&self) -> &str {
        "token-overlap"
    }

    fn rerank_scored(
        &self,
        query: &str,
        documents: &[Document],
        top_k: usize,
    ) -> Vec<ScoredDocument> {
        if top_k == 0 || documents.is_empty() {
            return Vec::new();
        }

        let query_counts = self.query_counts(query);
        if query_counts.is_empty() {
            return documents
                .iter()
                .take(top_k)
                .map(|doc| ScoredDocument {
                    document: doc.clone(),
                    score: 0.0,
                })
                .collect();
        }

        let (mut matched, unmatched): (Vec<_>, Vec<_>) = documents
            .iter()
            .map(|doc| (doc, self.score_counts(&query_counts, doc)))
            .partition(|(_, score)| *score > 0.0);

        // Stable: equal scores keep input order.
        matched.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        matched
            .into_iter()
            .chain(unmatched)
            .take(top_k)
            .map(|(doc, score)| ScoredDocument {
                document: doc.clone(),
                score,
            })
            .collect()
    }
}

/// Rerank `documents` with the default [`TokenReranker`].
pub fn token_rerank(query: &str, documents: &[Document], top_k: usize) -> Vec<Document> {
    TokenReranker::new().rerank(query, documents, top_k)
}
