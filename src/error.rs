//! Retrieval error types.
//!
//! # Error Handling Philosophy
//!
//! Partial success is the default. A degraded backend should cost the caller
//! some recall, not the whole answer, so most backend problems are absorbed by
//! the [`Retriever`](crate::retriever::Retriever) and reported through
//! [`SearchDiagnostics`](crate::retriever::SearchDiagnostics) instead of being
//! returned.
//!
//! | Error | Raised by | Handling |
//! |-------|-----------|----------|
//! | `InvalidArgument` | Pure components, retriever input checks | Surfaced |
//! | `BackendUnavailable` | Backend down, not configured, deadline missed | Recovered (empty list) |
//! | `Backend` | Any other backend failure | Recovered unless every backend fails |
//! | `DeadlineExceeded` | Global deadline before fusion | Surfaced |
//! | `HydrationMiss` | No backend produced a document for an ID | Recovered (ID dropped) |
//! | `AllBackendsFailed` | Every dispatched backend raised `Backend` | Surfaced |
//! | `CandidateSource` | Entity candidate listing failed | Surfaced |
//! | `Config` | Invalid or unreadable configuration | Surfaced |
//! | `Internal` | Bug in a pure component | Surfaced |

use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;
use crate::types::DocumentId;

/// Result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

// ============================================================================
// Retrieval Error Types
// ============================================================================

/// Errors that can occur in retrieval, fusion, reranking and entity detection.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// A caller-supplied argument is out of range (e.g. RRF `k < 1`, empty query).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A backend is down, not configured, or missed its deadline.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A backend failed for a reason other than availability.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The global deadline elapsed before fusion began.
    #[error("Search deadline of {0:?} exceeded before fusion")]
    DeadlineExceeded(Duration),

    /// A fused ID had no backend willing to hydrate it.
    #[error("No backend could hydrate document '{0}'")]
    HydrationMiss(DocumentId),

    /// Every dispatched backend failed with a non-availability error.
    #[error("All backends failed: {0}")]
    AllBackendsFailed(String),

    /// The entity candidate source could not list candidates.
    #[error("Candidate source error: {0}")]
    CandidateSource(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unexpected failure inside a pure component.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RetrievalError {
    /// Create an [`RetrievalError::InvalidArgument`] from anything displayable.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether the retriever absorbs this error locally instead of returning it.
    ///
    /// Recovered errors degrade the result (fewer candidates, dropped IDs) but
    /// never fail the search on their own.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable(_) | Self::Backend(_) | Self::HydrationMiss(_)
        )
    }

    /// Whether this error means the backend could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(RetrievalError::BackendUnavailable("down".into()).is_recoverable());
        assert!(RetrievalError::Backend("bad shard".into()).is_recoverable());
        assert!(RetrievalError::HydrationMiss("u1".into()).is_recoverable());

        assert!(!RetrievalError::invalid("k must be >= 1").is_recoverable());
        assert!(!RetrievalError::DeadlineExceeded(Duration::from_secs(5)).is_recoverable());
        assert!(!RetrievalError::AllBackendsFailed("dense, sparse".into()).is_recoverable());
        assert!(!RetrievalError::Internal("bug".into()).is_recoverable());
    }

    #[test]
    fn test_unavailable_is_distinct_from_backend_error() {
        assert!(RetrievalError::BackendUnavailable("timeout".into()).is_unavailable());
        assert!(!RetrievalError::Backend("500".into()).is_unavailable());
    }

    #[test]
    fn test_error_messages() {
        let err = RetrievalError::HydrationMiss("doc-7".into());
        assert_eq!(err.to_string(), "No backend could hydrate document 'doc-7'");

        let err = RetrievalError::invalid("top_k must be >= 0");
        assert_eq!(err.to_string(), "Invalid argument: top_k must be >= 0");
    }
}
