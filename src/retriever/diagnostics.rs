//! Search result envelope and diagnostics.
//!
//! Recovered failures never fail a search; they end up here so the
//! enclosing service can log or surface them.

use serde::Serialize;

use crate::backend::BackendKind;
use crate::error::RetrievalError;
use crate::types::{Document, DocumentId};

/// Lifecycle of a single search.
///
/// ```ascii
/// READY ─► DISPATCHED ─► PARTIAL | COMPLETE ─► FUSED ─► RERANKED? ─► RETURNED
///                              │
///                              └─► EMPTY (nothing to fuse, no fallback)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Inputs validated, nothing dispatched.
    Ready,
    /// Backend calls in flight.
    Dispatched,
    /// Some dispatched backends failed or timed out.
    Partial,
    /// Every dispatched backend answered.
    Complete,
    /// Ranked lists merged.
    Fused,
    /// Token reranker applied.
    Reranked,
    /// Terminal: documents returned.
    Returned,
    /// Terminal: no backend produced results and no fallback applied.
    Empty,
}

impl std::fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SearchPhase::Ready => "ready",
            SearchPhase::Dispatched => "dispatched",
            SearchPhase::Partial => "partial",
            SearchPhase::Complete => "complete",
            SearchPhase::Fused => "fused",
            SearchPhase::Reranked => "reranked",
            SearchPhase::Returned => "returned",
            SearchPhase::Empty => "empty",
        };
        write!(f, "{}", name)
    }
}

/// Which backend call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendStage {
    /// `search`
    Search,
    /// `hydrate`
    Hydrate,
}

/// Why a backend call contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    /// The backend reported itself unavailable.
    Unavailable(String),
    /// The per-backend deadline elapsed.
    TimedOut,
    /// Any other backend error.
    Error(String),
}

impl FailureReason {
    /// Classify a backend error.
    pub fn from_error(err: &RetrievalError) -> Self {
        match err {
            RetrievalError::BackendUnavailable(message) => Self::Unavailable(message.clone()),
            other => Self::Error(other.to_string()),
        }
    }

    /// Whether this counts as `BackendUnavailable` (timeouts included).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::TimedOut)
    }
}

/// A recovered backend failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendFailure {
    /// Backend name.
    pub backend: String,
    /// Role the backend played.
    pub kind: BackendKind,
    /// Call that failed.
    pub stage: BackendStage,
    /// What went wrong.
    pub reason: FailureReason,
}

impl std::fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self.stage {
            BackendStage::Search => "search",
            BackendStage::Hydrate => "hydrate",
        };
        match &self.reason {
            FailureReason::Unavailable(message) => write!(
                f,
                "{} {} backend '{}' unavailable: {}",
                self.kind, stage, self.backend, message
            ),
            FailureReason::TimedOut => write!(
                f,
                "{} {} backend '{}' missed its deadline",
                self.kind, stage, self.backend
            ),
            FailureReason::Error(message) => write!(
                f,
                "{} {} backend '{}' failed: {}",
                self.kind, stage, self.backend, message
            ),
        }
    }
}

/// What happened during a search besides the returned documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchDiagnostics {
    /// Terminal phase (`Returned` or `Empty`).
    pub phase: SearchPhase,
    /// Recovered backend failures, in dispatch order (dense first).
    pub backend_failures: Vec<BackendFailure>,
    /// Fused IDs no backend could hydrate, in fused order.
    pub hydration_misses: Vec<DocumentId>,
    /// Number of IDs after fusion (before hydration).
    pub fused_candidates: usize,
    /// Whether the token reranker ran.
    pub reranked: bool,
    /// Whether the fallback documents were used.
    pub used_fallback: bool,
}

impl SearchDiagnostics {
    pub(crate) fn new() -> Self {
        Self {
            phase: SearchPhase::Ready,
            backend_failures: Vec::new(),
            hydration_misses: Vec::new(),
            fused_candidates: 0,
            reranked: false,
            used_fallback: false,
        }
    }

    /// Number of recovered failures across search and hydration.
    pub fn failure_count(&self) -> usize {
        self.backend_failures.len()
    }

    /// Failures of the `search` stage only.
    pub fn search_failures(&self) -> impl Iterator<Item = &BackendFailure> {
        self.backend_failures
            .iter()
            .filter(|f| f.stage == BackendStage::Search)
    }
}

/// Documents plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Ranked documents, at most `top_n`, no duplicate IDs.
    pub documents: Vec<Document>,
    /// How the search went.
    pub diagnostics: SearchDiagnostics,
}

impl SearchOutcome {
    pub(crate) fn empty(mut diagnostics: SearchDiagnostics) -> Self {
        diagnostics.phase = SearchPhase::Empty;
        Self {
            documents: Vec::new(),
            diagnostics,
        }
    }
}
