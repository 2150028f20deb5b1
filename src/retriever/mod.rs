//! End-to-end hybrid retrieval: query in, ranked documents out.
//!
//! # Architecture
//!
//! ```ascii
//!                     ┌──────────────┐
//!                     │    query     │
//!                     └──────┬───────┘
//!              ┌─────────────┴─────────────┐   concurrent, each under
//!              ▼                           ▼   its own deadline
//!      ┌──────────────┐            ┌──────────────┐
//!      │ DenseBackend │            │SparseBackend │
//!      └──────┬───────┘            └──────┬───────┘
//!             │ ranked ids (or [])        │
//!             └─────────────┬─────────────┘
//!                           ▼
//!                  RRF fusion (top pool)
//!                           ▼
//!             hydrate (concurrent, dense wins)
//!                           ▼
//!                 TokenReranker (optional)
//!                           ▼
//!                      truncate top_n
//! ```
//!
//! # Failure Policy
//!
//! - A backend that is unavailable, errors, or misses its deadline
//!   contributes an empty list and is recorded in [`SearchDiagnostics`].
//! - If every dispatched backend fails with a non-availability error the
//!   search fails with [`RetrievalError::AllBackendsFailed`].
//! - If the global deadline elapses before fusion the search fails with
//!   [`RetrievalError::DeadlineExceeded`].
//! - IDs nobody can hydrate are dropped and listed in the diagnostics.

mod diagnostics;
mod options;

pub use diagnostics::{
    BackendFailure, BackendStage, FailureReason, SearchDiagnostics, SearchOutcome, SearchPhase,
};
pub use options::SearchOptions;

use futures::future::{join_all, BoxFuture};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::{BackendKind, BackendSet, SearchBackend};
use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};
use crate::reranker::{Reranker, RrfFuser, TokenReranker};
use crate::types::{Document, DocumentId, RankedList};

/// Values resolved from [`SearchOptions`] and [`RetrievalConfig`] for one search.
#[derive(Debug, Clone, Copy)]
struct SearchPlan {
    use_dense: bool,
    use_sparse: bool,
    fuser: RrfFuser,
    pool: usize,
    rerank: Option<bool>,
    per_backend_deadline: Duration,
    global_deadline: Duration,
}

/// Result of one backend `search` call.
struct BackendOutcome {
    backend: String,
    kind: BackendKind,
    result: std::result::Result<RankedList, FailureReason>,
}

/// Hybrid retriever over a [`BackendSet`].
///
/// Holds no mutable state; a single instance can serve concurrent requests.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use aurora_retrieval::{BackendSet, Document, MockBackend, Retriever, SearchOptions};
///
/// # tokio_test_block(async {
/// let sparse = MockBackend::new("bm25").with_documents(vec![
///     Document::new("u4", "OtherCo raises Series B"),
/// ]);
/// let retriever = Retriever::new(BackendSet::none().with_sparse(Arc::new(sparse)));
///
/// let docs = retriever.search("OtherCo funding", 5, &SearchOptions::new()).await.unwrap();
/// assert_eq!(docs[0].id, "u4");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
/// # }
/// ```
pub struct Retriever {
    backends: BackendSet,
    config: RetrievalConfig,
    reranker: Arc<dyn Reranker>,
}

impl Retriever {
    /// Create a retriever with the default configuration.
    pub fn new(backends: BackendSet) -> Self {
        let config = RetrievalConfig::default();
        let reranker = Self::default_reranker(&config);
        Self {
            backends,
            config,
            reranker,
        }
    }

    /// Create a retriever with a validated configuration.
    pub fn with_config(backends: BackendSet, config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        let reranker = Self::default_reranker(&config);
        Ok(Self {
            backends,
            config,
            reranker,
        })
    }

    /// Replace the final-stage reranker.
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = reranker;
        self
    }

    /// The configured backends.
    pub fn backends(&self) -> &BackendSet {
        &self.backends
    }

    /// The active configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    fn default_reranker(config: &RetrievalConfig) -> Arc<dyn Reranker> {
        Arc::new(
            TokenReranker::new()
                .with_tokenizer(config.tokenizer())
                .with_tag_boost(config.tag_boost),
        )
    }

    /// Search and return at most `top_n` documents.
    pub async fn search(
        &self,
        query: &str,
        top_n: usize,
        options: &SearchOptions,
    ) -> Result<Vec<Document>> {
        Ok(self
            .search_with_diagnostics(query, top_n, options)
            .await?
            .documents)
    }

    /// Search and return documents together with [`SearchDiagnostics`].
    pub async fn search_with_diagnostics(
        &self,
        query: &str,
        top_n: usize,
        options: &SearchOptions,
    ) -> Result<SearchOutcome> {
        let mut diagnostics = SearchDiagnostics::new();

        if self.backends.is_empty() {
            debug!("No retrieval backends configured, returning empty result");
            return Ok(SearchOutcome::empty(diagnostics));
        }

        let query = query.trim();
        if query.is_empty() {
            return Err(RetrievalError::invalid("query must not be empty"));
        }
        let plan = self.plan(top_n, options)?;
        if top_n == 0 {
            return Ok(SearchOutcome::empty(diagnostics));
        }

        diagnostics.phase = SearchPhase::Dispatched;
        debug!(
            query,
            top_n,
            pool = plan.pool,
            dense = plan.use_dense,
            sparse = plan.use_sparse,
            "Dispatching search"
        );

        let outcomes = tokio::time::timeout(plan.global_deadline, self.dispatch(query, &plan))
            .await
            .map_err(|_| {
                warn!(
                    deadline = ?plan.global_deadline,
                    "Global search deadline exceeded before fusion"
                );
                RetrievalError::DeadlineExceeded(plan.global_deadline)
            })?;

        let dispatched = outcomes.len();
        let mut lists: Vec<RankedList> = Vec::with_capacity(dispatched);
        let mut answered: Vec<BackendKind> = Vec::with_capacity(dispatched);
        let mut hard_failures = 0;

        for outcome in outcomes {
            match outcome.result {
                Ok(list) => {
                    debug!(
                        backend = %outcome.backend,
                        kind = %outcome.kind,
                        hits = list.len(),
                        "Backend answered"
                    );
                    lists.push(list);
                    answered.push(outcome.kind);
                }
                Err(reason) => {
                    if !reason.is_unavailable() {
                        hard_failures += 1;
                    }
                    let failure = BackendFailure {
                        backend: outcome.backend,
                        kind: outcome.kind,
                        stage: BackendStage::Search,
                        reason,
                    };
                    warn!("{}", failure);
                    diagnostics.backend_failures.push(failure);
                }
            }
        }

        if dispatched > 0 && hard_failures == dispatched {
            let summary = diagnostics
                .backend_failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RetrievalError::AllBackendsFailed(summary));
        }

        diagnostics.phase = if lists.len() == dispatched {
            SearchPhase::Complete
        } else {
            SearchPhase::Partial
        };

        let fused = plan.fuser.fuse(&lists, Some(plan.pool));
        diagnostics.fused_candidates = fused.len();
        diagnostics.phase = SearchPhase::Fused;

        if fused.is_empty() {
            return Ok(self.fallback(query, top_n, options, diagnostics));
        }

        let documents = self
            .hydrate(&fused, &answered, plan.per_backend_deadline, &mut diagnostics)
            .await;

        let rerank = plan
            .rerank
            .unwrap_or_else(|| documents.iter().any(|d| !d.text.is_empty()));
        let mut documents = if rerank {
            diagnostics.reranked = true;
            diagnostics.phase = SearchPhase::Reranked;
            self.reranker.rerank(query, &documents, documents.len())
        } else {
            documents
        };
        documents.truncate(top_n);

        diagnostics.phase = SearchPhase::Returned;
        debug!(
            returned = documents.len(),
            fused = diagnostics.fused_candidates,
            failures = diagnostics.failure_count(),
            misses = diagnostics.hydration_misses.len(),
            "Search complete"
        );

        Ok(SearchOutcome {
            documents,
            diagnostics,
        })
    }

    fn plan(&self, top_n: usize, options: &SearchOptions) -> Result<SearchPlan> {
        let fuser = RrfFuser::with_k(options.fusion_k.unwrap_or(self.config.fusion_k))?;
        let pool = match options.candidate_pool {
            Some(0) => {
                return Err(RetrievalError::invalid("candidate_pool must be >= 1"));
            }
            Some(pool) => pool,
            None => self.config.candidate_pool(top_n),
        };

        Ok(SearchPlan {
            use_dense: options.use_dense.unwrap_or(true) && self.backends.dense().is_some(),
            use_sparse: options.use_sparse.unwrap_or(true) && self.backends.sparse().is_some(),
            fuser,
            pool,
            rerank: options.rerank,
            per_backend_deadline: options
                .per_backend_deadline
                .unwrap_or_else(|| self.config.per_backend_deadline()),
            global_deadline: options
                .global_deadline
                .unwrap_or_else(|| self.config.global_deadline()),
        })
    }

    /// Query every enabled backend concurrently; results keep dense-first order.
    async fn dispatch(&self, query: &str, plan: &SearchPlan) -> Vec<BackendOutcome> {
        let mut calls: Vec<BoxFuture<'_, BackendOutcome>> = Vec::with_capacity(2);

        if let Some(dense) = self.backends.dense().filter(|_| plan.use_dense) {
            calls.push(Box::pin(search_backend(
                BackendKind::Dense,
                dense.as_ref(),
                query,
                plan.pool,
                plan.per_backend_deadline,
            )));
        }
        if let Some(sparse) = self.backends.sparse().filter(|_| plan.use_sparse) {
            calls.push(Box::pin(search_backend(
                BackendKind::Sparse,
                sparse.as_ref(),
                query,
                plan.pool,
                plan.per_backend_deadline,
            )));
        }

        join_all(calls).await
    }

    /// Materialize fused IDs from the backends that answered the search.
    ///
    /// Both backends hydrate concurrently; a dense copy of a document takes
    /// precedence over a sparse one.
    async fn hydrate(
        &self,
        fused: &[DocumentId],
        answered: &[BackendKind],
        deadline: Duration,
        diagnostics: &mut SearchDiagnostics,
    ) -> Vec<Document> {
        let dense = self
            .backends
            .dense()
            .filter(|_| answered.contains(&BackendKind::Dense));
        let sparse = self
            .backends
            .sparse()
            .filter(|_| answered.contains(&BackendKind::Sparse));

        let dense_call = async {
            match dense {
                Some(backend) => Some(hydrate_backend(backend.as_ref(), fused, deadline).await),
                None => None,
            }
        };
        let sparse_call = async {
            match sparse {
                Some(backend) => Some(hydrate_backend(backend.as_ref(), fused, deadline).await),
                None => None,
            }
        };
        let (dense_result, sparse_result) = futures::join!(dense_call, sparse_call);

        let mut found: HashMap<DocumentId, Document> = HashMap::new();
        if let (Some(backend), Some(result)) = (dense, dense_result) {
            let name = backend.name();
            absorb_hydration(&mut found, diagnostics, BackendKind::Dense, name, fused, result);
        }
        if let (Some(backend), Some(result)) = (sparse, sparse_result) {
            let name = backend.name();
            absorb_hydration(&mut found, diagnostics, BackendKind::Sparse, name, fused, result);
        }

        let mut documents = Vec::with_capacity(fused.len());
        for id in fused {
            match found.remove(id) {
                Some(doc) => documents.push(doc),
                None => {
                    debug!("{}", RetrievalError::HydrationMiss(id.clone()));
                    diagnostics.hydration_misses.push(id.clone());
                }
            }
        }
        documents
    }

    /// Rerank caller-supplied documents when the backends produced nothing.
    fn fallback(
        &self,
        query: &str,
        top_n: usize,
        options: &SearchOptions,
        mut diagnostics: SearchDiagnostics,
    ) -> SearchOutcome {
        if options.fallback_documents.is_empty() {
            debug!("No backend results and no fallback documents");
            return SearchOutcome::empty(diagnostics);
        }

        let mut seen = HashSet::new();
        let candidates: Vec<Document> = options
            .fallback_documents
            .iter()
            .filter(|doc| seen.insert(doc.id.clone()))
            .cloned()
            .collect();

        diagnostics.used_fallback = true;
        diagnostics.reranked = true;
        diagnostics.phase = SearchPhase::Returned;
        debug!(candidates = candidates.len(), "Reranking fallback documents");

        SearchOutcome {
            documents: self.reranker.rerank(query, &candidates, top_n),
            diagnostics,
        }
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("backends", &self.backends)
            .field("config", &self.config)
            .field("reranker", &self.reranker.name())
            .finish()
    }
}

async fn search_backend<B>(
    kind: BackendKind,
    backend: &B,
    query: &str,
    k: usize,
    deadline: Duration,
) -> BackendOutcome
where
    B: SearchBackend + ?Sized,
{
    let result = match tokio::time::timeout(deadline, backend.search(query, k)).await {
        Ok(Ok(mut list)) => {
            list.truncate(k);
            Ok(list)
        }
        Ok(Err(err)) => Err(FailureReason::from_error(&err)),
        Err(_) => Err(FailureReason::TimedOut),
    };

    BackendOutcome {
        backend: backend.name().to_string(),
        kind,
        result,
    }
}

async fn hydrate_backend<B>(
    backend: &B,
    ids: &[DocumentId],
    deadline: Duration,
) -> std::result::Result<HashMap<DocumentId, Document>, FailureReason>
where
    B: SearchBackend + ?Sized,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    match tokio::time::timeout(deadline, backend.hydrate(ids)).await {
        Ok(Ok(documents)) => Ok(documents),
        Ok(Err(err)) => Err(FailureReason::from_error(&err)),
        Err(_) => Err(FailureReason::TimedOut),
    }
}

fn absorb_hydration(
    found: &mut HashMap<DocumentId, Document>,
    diagnostics: &mut SearchDiagnostics,
    kind: BackendKind,
    backend: &str,
    requested: &[DocumentId],
    result: std::result::Result<HashMap<DocumentId, Document>, FailureReason>,
) {
    match result {
        Ok(mut documents) => {
            for id in requested {
                let Some(doc) = documents.remove(id) else {
                    continue;
                };
                if doc.id != *id {
                    debug!(
                        backend,
                        requested = %id,
                        returned = %doc.id,
                        "Ignoring hydrated document with a different id"
                    );
                    continue;
                }
                found.entry(id.clone()).or_insert(doc);
            }
        }
        Err(reason) => {
            let failure = BackendFailure {
                backend: backend.to_string(),
                kind,
                stage: BackendStage::Hydrate,
                reason,
            };
            warn!("{}", failure);
            diagnostics.backend_failures.push(failure);
        }
    }
}
