//! Per-request search options.

use std::time::Duration;

use crate::types::Document;

/// Overrides for a single search.
///
/// Every field is optional; `None` means "use the retriever's configuration
/// or the documented default".
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use aurora_retrieval::SearchOptions;
///
/// let options = SearchOptions::new()
///     .with_dense(false)
///     .with_rerank(false)
///     .with_per_backend_deadline(Duration::from_millis(500));
/// assert_eq!(options.use_dense, Some(false));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Include dense results. Default: a dense backend is configured.
    pub use_dense: Option<bool>,
    /// Include sparse results. Default: a sparse backend is configured.
    pub use_sparse: Option<bool>,
    /// RRF `k`. Default: configuration `fusion_k`.
    pub fusion_k: Option<u32>,
    /// Per-backend `k`. Default: `max(top_n × multiplier, min)`.
    pub candidate_pool: Option<usize>,
    /// Apply the token reranker to the fused pool. Default: when some backend
    /// returned results and a hydrated document has text.
    pub rerank: Option<bool>,
    /// Deadline for each backend call.
    pub per_backend_deadline: Option<Duration>,
    /// Deadline for the dispatch phase.
    pub global_deadline: Option<Duration>,
    /// Documents to rerank when the configured backends return nothing.
    pub fallback_documents: Vec<Document>,
}

impl SearchOptions {
    /// Options with every value defaulted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the dense backend.
    pub fn with_dense(mut self, enabled: bool) -> Self {
        self.use_dense = Some(enabled);
        self
    }

    /// Enable or disable the sparse backend.
    pub fn with_sparse(mut self, enabled: bool) -> Self {
        self.use_sparse = Some(enabled);
        self
    }

    /// Set the RRF `k`.
    pub fn with_fusion_k(mut self, k: u32) -> Self {
        self.fusion_k = Some(k);
        self
    }

    /// Set the per-backend candidate pool.
    pub fn with_candidate_pool(mut self, pool: usize) -> Self {
        self.candidate_pool = Some(pool);
        self
    }

    /// Force reranking on or off.
    pub fn with_rerank(mut self, rerank: bool) -> Self {
        self.rerank = Some(rerank);
        self
    }

    /// Set the per-backend deadline.
    pub fn with_per_backend_deadline(mut self, deadline: Duration) -> Self {
        self.per_backend_deadline = Some(deadline);
        self
    }

    /// Set the global dispatch deadline.
    pub fn with_global_deadline(mut self, deadline: Duration) -> Self {
        self.global_deadline = Some(deadline);
        self
    }

    /// Supply fallback documents.
    pub fn with_fallback_documents(mut self, documents: Vec<Document>) -> Self {
        self.fallback_documents = documents;
        self
    }
}
