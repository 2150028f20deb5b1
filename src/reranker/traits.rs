//! Reranker trait definition.
//!
//! Rerankers in this crate are pure: no I/O and no suspension, so the trait
//! is synchronous and can run inside the retriever's pipeline or on a
//! caller's own document set.
//!
//! # Implementations
//!
//! - [`super::TokenReranker`] - Token overlap with tag boost and pluggable IDF

use super::result::ScoredDocument;
use crate::types::Document;

/// Trait for document rerankers.
///
/// # Required Methods
///
/// - [`name`](Reranker::name) - Identifier for the reranker
/// - [`rerank_scored`](Reranker::rerank_scored) - Main reranking operation
///
/// # Provided Methods
///
/// - [`rerank`](Reranker::rerank) - Same ordering, scores dropped
pub trait Reranker: Send + Sync {
    /// Get the name of this reranker.
    fn name(&self) -> &str;

    /// Reorder `documents` by relevance to `query`, keeping at most `top_k`.
    fn rerank_scored(&self, query: &str, documents: &[Document], top_k: usize)
        -> Vec<ScoredDocument>;

    /// Reorder `documents`, returning only the documents.
    fn rerank(&self, query: &str, documents: &[Document], top_k: usize) -> Vec<Document> {
        self.rerank_scored(query, documents, top_k)
            .into_iter()
            .map(|scored| scored.document)
            .collect()
    }
}
