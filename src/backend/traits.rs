//! Backend capability traits.
//!
//! # Architecture
//!
//! ```ascii
//!                      ┌─────────────────┐
//!                      │  SearchBackend  │  search(query, k) / hydrate(ids)
//!                      └────────┬────────┘
//!                               │
//!               ┌───────────────┴───────────────┐
//!               ▼                               ▼
//!        ┌──────────────┐                ┌──────────────┐
//!        │ DenseBackend │                │SparseBackend │
//!        │  (vectors)   │                │ (BM25, FTS)  │
//!        └──────────────┘                └──────────────┘
//! ```
//!
//! # Implementations
//!
//! - [`super::MockBackend`] - Fixed results for tests and offline wiring
//! - [`super::Bm25Backend`] - In-memory BM25 over a document set

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::types::{Document, DocumentId, RankedList};

/// A retrieval backend: ranked search plus document hydration.
///
/// Implementations must be internally thread-safe; the retriever calls them
/// concurrently without serializing access.
///
/// # Required Methods
///
/// - [`name`](SearchBackend::name) - Identifier used in logs and diagnostics
/// - [`search`](SearchBackend::search) - Ranked IDs for a query
/// - [`hydrate`](SearchBackend::hydrate) - Documents for IDs
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Search for the `k` most relevant documents.
    ///
    /// Returns at most `k` IDs, best first, without duplicates. Must be
    /// deterministic for a fixed index state. Return
    /// [`RetrievalError::BackendUnavailable`](crate::RetrievalError::BackendUnavailable)
    /// when the backend cannot be reached.
    async fn search(&self, query: &str, k: usize) -> Result<RankedList>;

    /// Materialize documents for `ids`.
    ///
    /// IDs the backend does not know are simply absent from the map.
    async fn hydrate(&self, ids: &[DocumentId]) -> Result<HashMap<DocumentId, Document>>;
}

/// Semantic (vector similarity) backend.
pub trait DenseBackend: SearchBackend {}

/// Lexical (BM25, full-text) backend.
pub trait SparseBackend: SearchBackend {}

/// Which role a backend plays in a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Dense / vector backend.
    Dense,
    /// Sparse / lexical backend.
    Sparse,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Dense => write!(f, "dense"),
            BackendKind::Sparse => write!(f, "sparse"),
        }
    }
}
