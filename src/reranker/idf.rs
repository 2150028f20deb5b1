//! Inverse document frequency sources for the token reranker.
//!
//! Without corpus statistics every token weighs 1.0 ([`UniformIdf`]). A host
//! that knows its corpus can plug in [`CorpusIdf`] so rare tokens ("exampleai")
//! outweigh common ones ("company").

use std::collections::{HashMap, HashSet};

use crate::tokenizer::Tokenizer;
use crate::types::Document;

/// Supplies an IDF weight per token.
pub trait IdfSource: Send + Sync + std::fmt::Debug {
    /// Weight for `token`. Must be finite and non-negative.
    fn idf(&self, token: &str) -> f64;
}

/// Every token weighs 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformIdf;

impl IdfSource for UniformIdf {
    fn idf(&self, _token: &str) -> f64 {
        1.0
    }
}

/// BM25-style IDF computed from a document collection.
///
/// `IDF(t) = ln((N - df(t) + 0.5) / (df(t) + 0.5) + 1)`, which stays positive
/// even for tokens present in every document. Unseen tokens get the maximum
/// weight (`df = 0`).
#[derive(Debug, Clone, Default)]
pub struct CorpusIdf {
    doc_count: usize,
    doc_freqs: HashMap<String, usize>,
}

impl CorpusIdf {
    /// Compute document frequencies over text and tags of `documents`.
    pub fn from_documents(documents: &[Document], tokenizer: &Tokenizer) -> Self {
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let mut unique: HashSet<String> = tokenizer.token_set(&doc.text);
            for tag in &doc.tags {
                unique.extend(tokenizer.tokenize(tag));
            }
            for token in unique {
                *doc_freqs.entry(token).or_insert(0) += 1;
            }
        }

        Self {
            doc_count: documents.len(),
            doc_freqs,
        }
    }

    /// Number of documents the statistics were computed over.
    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    /// Document frequency of `token`.
    pub fn doc_freq(&self, token: &str) -> usize {
        self.doc_freqs.get(token).copied().unwrap_or(0)
    }
}

impl IdfSource for CorpusIdf {
    fn idf(&self, token: &str) -> f64 {
        let n = self.doc_count as f64;
        let df = self.doc_freq(token) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }
}
