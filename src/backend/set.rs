//! The configured backends, as a total variant.

use std::sync::Arc;

use super::traits::{DenseBackend, SparseBackend};

/// The (possibly empty) set of configured backends.
///
/// Modeled as a variant rather than two nullable fields so every dispatch
/// site handles each combination explicitly.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use aurora_retrieval::{BackendSet, MockBackend};
///
/// let set = BackendSet::none().with_sparse(Arc::new(MockBackend::new("bm25")));
/// assert!(set.dense().is_none());
/// assert!(set.sparse().is_some());
/// ```
#[derive(Clone, Default)]
pub enum BackendSet {
    /// No backend configured. Searches return nothing.
    #[default]
    None,
    /// Only a dense backend.
    DenseOnly(Arc<dyn DenseBackend>),
    /// Only a sparse backend.
    SparseOnly(Arc<dyn SparseBackend>),
    /// Both backends.
    Both {
        dense: Arc<dyn DenseBackend>,
        sparse: Arc<dyn SparseBackend>,
    },
}

impl BackendSet {
    /// An empty set.
    pub fn none() -> Self {
        Self::None
    }

    /// Build from optional backends.
    pub fn from_parts(
        dense: Option<Arc<dyn DenseBackend>>,
        sparse: Option<Arc<dyn SparseBackend>>,
    ) -> Self {
        match (dense, sparse) {
            (None, None) => Self::None,
            (Some(dense), None) => Self::DenseOnly(dense),
            (None, Some(sparse)) => Self::SparseOnly(sparse),
            (Some(dense), Some(sparse)) => Self::Both { dense, sparse },
        }
    }

    /// Add or replace the dense backend.
    pub fn with_dense(self, dense: Arc<dyn DenseBackend>) -> Self {
        Self::from_parts(Some(dense), self.sparse().cloned())
    }

    /// Add or replace the sparse backend.
    pub fn with_sparse(self, sparse: Arc<dyn SparseBackend>) -> Self {
        Self::from_parts(self.dense().cloned(), Some(sparse))
    }

    /// The dense backend, if configured.
    pub fn dense(&self) -> Option<&Arc<dyn DenseBackend>> {
        match self {
            Self::DenseOnly(dense) | Self::Both { dense, .. } => Some(dense),
            Self::None | Self::SparseOnly(_) => None,
        }
    }

    /// The sparse backend, if configured.
    pub fn sparse(&self) -> Option<&Arc<dyn SparseBackend>> {
        match self {
            Self::SparseOnly(sparse) | Self::Both { sparse, .. } => Some(sparse),
            Self::None | Self::DenseOnly(_) => None,
        }
    }

    /// Whether no backend is configured.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Names of the configured backends, dense first.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(dense) = self.dense() {
            names.push(dense.name().to_string());
        }
        if let Some(sparse) = self.sparse() {
            names.push(sparse.name().to_string());
        }
        names
    }
}

impl std::fmt::Debug for BackendSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSet")
            .field("dense", &self.dense().map(|b| b.name().to_string()))
            .field("sparse", &self.sparse().map(|b| b.name().to_string()))
            .finish()
    }
}
