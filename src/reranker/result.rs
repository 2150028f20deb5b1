//! Reranking result types.

use serde::{Deserialize, Serialize};

use crate::types::Document;

/// A document with the score a reranker gave it.
///
/// # Example
///
/// ```ignore
/// let results = reranker.rerank_scored(query, &documents, 10);
/// for result in results {
///     println!("{} scored {:.3}", result.document.id, result.score);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// The reranked document.
    pub document: Document,
    /// Relevance score (higher is more relevant, 0 means no overlap).
    pub score: f64,
}
