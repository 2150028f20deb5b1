//! Mock backend for testing and offline wiring.
//!
//! `MockBackend` returns a fixed ranked list, hydrates from a fixed document
//! map, and can be told to fail or to stall, which is all the retriever's
//! degradation paths need.
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                  MockBackend                   │
//! ├────────────────────────────────────────────────┤
//! │ with_documents()     ─► ranked ids + hydration │
//! │ with_results()       ─► ranked ids only        │
//! │ unavailable()        ─► BackendUnavailable     │
//! │ failing()            ─► Backend error          │
//! │ with_delay()         ─► sleeps before search   │
//! │ with_hydrate_delay() ─► sleeps before hydrate  │
//! └────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::traits::{DenseBackend, SearchBackend, SparseBackend};
use crate::error::{Result, RetrievalError};
use crate::types::{Document, DocumentId, RankedList};

/// How a [`MockBackend`] fails.
#[derive(Debug, Clone)]
enum MockFailure {
    Unavailable(String),
    Error(String),
}

/// Deterministic in-memory backend.
///
/// Clones share call counters, so a test can keep a handle after moving the
/// backend into a [`BackendSet`](super::BackendSet).
///
/// # Example
///
/// ```
/// use aurora_retrieval::{Document, MockBackend};
///
/// let backend = MockBackend::new("bm25").with_documents(vec![
///     Document::new("u4", "OtherCo raises Series B"),
///     Document::new("u5", "OtherCo hires a CFO"),
/// ]);
/// assert_eq!(backend.search_calls(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    name: String,
    results: RankedList,
    documents: HashMap<DocumentId, Document>,
    failure: Option<MockFailure>,
    delay: Option<Duration>,
    hydrate_delay: Option<Duration>,
    search_calls: Arc<AtomicUsize>,
    hydrate_calls: Arc<AtomicUsize>,
    last_k: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create an empty backend that returns no results.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
            documents: HashMap::new(),
            failure: None,
            delay: None,
            hydrate_delay: None,
            search_calls: Arc::new(AtomicUsize::new(0)),
            hydrate_calls: Arc::new(AtomicUsize::new(0)),
            last_k: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Rank these IDs (in order) without making them hydratable.
    pub fn with_results<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<DocumentId>,
    {
        self.results = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Rank these documents (in order) and make them hydratable.
    pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
        self.results = documents.iter().map(|d| d.id.clone()).collect();
        self.documents = documents.into_iter().map(|d| (d.id.clone(), d)).collect();
        self
    }

    /// Make documents hydratable without ranking them.
    pub fn with_hydration(mut self, documents: Vec<Document>) -> Self {
        self.documents
            .extend(documents.into_iter().map(|d| (d.id.clone(), d)));
        self
    }

    /// Fail every call with [`RetrievalError::BackendUnavailable`].
    pub fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(MockFailure::Unavailable(reason.into()));
        self
    }

    /// Fail every call with [`RetrievalError::Backend`].
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(MockFailure::Error(reason.into()));
        self
    }

    /// Sleep this long before answering a search.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep this long before answering a hydration.
    pub fn with_hydrate_delay(mut self, delay: Duration) -> Self {
        self.hydrate_delay = Some(delay);
        self
    }

    /// Number of `search` calls so far.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of `hydrate` calls so far.
    pub fn hydrate_calls(&self) -> usize {
        self.hydrate_calls.load(Ordering::SeqCst)
    }

    /// The `k` passed to the most recent `search` call.
    pub fn last_k(&self) -> usize {
        self.last_k.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            None => Ok(()),
            Some(MockFailure::Unavailable(reason)) => Err(RetrievalError::BackendUnavailable(
                format!("{}: {}", self.name, reason),
            )),
            Some(MockFailure::Error(reason)) => Err(RetrievalError::Backend(format!(
                "{}: {}",
                self.name, reason
            ))),
        }
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str, k: usize) -> Result<RankedList> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.last_k.store(k, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;

        Ok(self.results.iter().take(k).cloned().collect())
    }

    async fn hydrate(&self, ids: &[DocumentId]) -> Result<HashMap<DocumentId, Document>> {
        self.hydrate_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.hydrate_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;

        Ok(ids
            .iter()
            .filter_map(|id| self.documents.get(id).map(|d| (id.clone(), d.clone())))
            .collect())
    }
}

impl DenseBackend for MockBackend {}

impl SparseBackend for MockBackend {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_truncates_to_k() {
        let backend = MockBackend::new("mock").with_results(["u1", "u2", "u3"]);
        let results = backend.search("anything", 2).await.unwrap();
        assert_eq!(results, vec!["u1", "u2"]);
        assert_eq!(backend.search_calls(), 1);
        assert_eq!(backend.last_k(), 2);
    }

    #[tokio::test]
    async fn test_hydrate_returns_known_ids_only() {
        let backend = MockBackend::new("mock")
            .with_documents(vec![Document::new("u1", "alpha")])
            .with_hydration(vec![Document::new("x9", "hidden")]);

        let ids = vec!["u1".to_string(), "x9".to_string(), "missing".to_string()];
        let docs = backend.hydrate(&ids).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs["u1"].text, "alpha");
        assert!(!docs.contains_key("missing"));
        assert_eq!(backend.search("q", 10).await.unwrap(), vec!["u1"]);
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let down = MockBackend::new("vec").unavailable("connection refused");
        let err = down.search("q", 5).await.unwrap_err();
        assert!(err.is_unavailable());

        let broken = MockBackend::new("vec").failing("index corrupted");
        let err = broken.search("q", 5).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Backend(_)));
        assert!(broken.hydrate(&["u1".to_string()]).await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_counters() {
        let backend = MockBackend::new("mock");
        let handle = backend.clone();
        backend.search("q", 1).await.unwrap();
        assert_eq!(handle.search_calls(), 1);
    }
}
