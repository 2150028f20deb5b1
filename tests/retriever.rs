//! End-to-end tests for the hybrid Retriever.
//!
//! All backends are in-process (`MockBackend`, `Bm25Backend`), so these run
//! offline. Deadline tests use tokio's paused clock; no real time passes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aurora_retrieval::{
    BackendKind, BackendSet, BackendStage, Bm25Backend, Document, DocumentId, FailureReason,
    MockBackend, RankedList, Reranker, RetrievalConfig, RetrievalError, Retriever,
    ScoredDocument, SearchBackend, SearchOptions, SearchPhase, SparseBackend,
};
use tokio::time::Instant;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ids(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.id.as_str()).collect()
}

fn sparse_news() -> MockBackend {
    MockBackend::new("bm25").with_documents(vec![
        Document::new("u4", "OtherCo raises Series B"),
        Document::new("u5", "OtherCo hires a new CFO"),
    ])
}

fn retriever(dense: MockBackend, sparse: MockBackend) -> Retriever {
    Retriever::new(
        BackendSet::none()
            .with_dense(Arc::new(dense))
            .with_sparse(Arc::new(sparse)),
    )
}

// =========== Fusion through the retriever ===========

#[tokio::test]
async fn test_fuses_dense_and_sparse() {
    init_tracing();
    let dense = MockBackend::new("vectors").with_documents(vec![
        Document::new("u1", "one"),
        Document::new("u2", "two"),
        Document::new("u3", "three"),
    ]);
    let sparse = MockBackend::new("bm25").with_documents(vec![
        Document::new("u3", "three"),
        Document::new("u4", "four"),
        Document::new("u5", "five"),
    ]);
    let retriever = retriever(dense, sparse);

    let options = SearchOptions::new().with_rerank(false);
    let outcome = retriever
        .search_with_diagnostics("anything", 3, &options)
        .await
        .unwrap();

    assert_eq!(ids(&outcome.documents), vec!["u3", "u1", "u2"]);
    assert_eq!(outcome.diagnostics.phase, SearchPhase::Returned);
    assert_eq!(outcome.diagnostics.fused_candidates, 5);
    assert!(!outcome.diagnostics.reranked);
    assert_eq!(outcome.diagnostics.failure_count(), 0);
}

#[tokio::test]
async fn test_identical_searches_are_deterministic() {
    let retriever = retriever(
        MockBackend::new("vectors").with_documents(vec![
            Document::new("a", "alpha beta"),
            Document::new("b", "beta"),
        ]),
        MockBackend::new("bm25").with_documents(vec![
            Document::new("b", "beta"),
            Document::new("c", "alpha"),
        ]),
    );

    let first = retriever.search("alpha", 3, &SearchOptions::new()).await.unwrap();
    let second = retriever.search("alpha", 3, &SearchOptions::new()).await.unwrap();
    assert_eq!(first, second);
}

// =========== Degradation ===========

#[tokio::test]
async fn test_backend_failure_is_tolerated() {
    init_tracing();
    let dense = MockBackend::new("vectors").failing("index corrupted");
    let retriever = retriever(dense, sparse_news());

    let outcome = retriever
        .search_with_diagnostics("OtherCo", 2, &SearchOptions::new())
        .await
        .unwrap();

    assert_eq!(ids(&outcome.documents), vec!["u4", "u5"]);
    assert_eq!(outcome.diagnostics.failure_count(), 1);

    let failure = &outcome.diagnostics.backend_failures[0];
    assert_eq!(failure.backend, "vectors");
    assert_eq!(failure.kind, BackendKind::Dense);
    assert_eq!(failure.stage, BackendStage::Search);
    assert!(matches!(
        failure.reason,
        FailureReason::Error(ref m) if m.contains("index corrupted")
    ));
}

#[tokio::test(start_paused = true)]
async fn test_slow_backend_misses_its_deadline() {
    init_tracing();
    let dense = MockBackend::new("vectors")
        .with_documents(vec![Document::new("u1", "OtherCo profile")])
        .with_delay(Duration::from_secs(3));
    let retriever = retriever(dense.clone(), sparse_news());

    let outcome = retriever
        .search_with_diagnostics("OtherCo", 2, &SearchOptions::new())
        .await
        .unwrap();

    assert_eq!(ids(&outcome.documents), vec!["u4", "u5"]);
    assert_eq!(dense.search_calls(), 1);
    assert_eq!(dense.hydrate_calls(), 0);

    let failures: Vec<_> = outcome.diagnostics.search_failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].reason, FailureReason::TimedOut);
    assert!(failures[0].reason.is_unavailable());
}

#[tokio::test(start_paused = true)]
async fn test_global_deadline_fails_the_search() {
    let slow = || {
        MockBackend::new("slow")
            .with_results(["u1"])
            .with_delay(Duration::from_secs(3))
    };
    let retriever = retriever(slow(), slow());

    let options = SearchOptions::new()
        .with_per_backend_deadline(Duration::from_secs(10))
        .with_global_deadline(Duration::from_secs(1));
    let err = retriever.search("query", 5, &options).await.unwrap_err();

    assert!(matches!(err, RetrievalError::DeadlineExceeded(d) if d == Duration::from_secs(1)));
}

#[tokio::test]
async fn test_all_backends_failing_is_an_error() {
    let retriever = retriever(
        MockBackend::new("vectors").failing("boom"),
        MockBackend::new("bm25").failing("bang"),
    );

    let err = retriever
        .search("query", 5, &SearchOptions::new())
        .await
        .unwrap_err();

    match err {
        RetrievalError::AllBackendsFailed(message) => {
            assert!(message.contains("vectors"));
            assert!(message.contains("bm25"));
        }
        other => panic!("expected AllBackendsFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_all_backends_unavailable_is_empty_not_error() {
    let retriever = retriever(
        MockBackend::new("vectors").unavailable("connection refused"),
        MockBackend::new("bm25").unavailable("not configured"),
    );

    let outcome = retriever
        .search_with_diagnostics("query", 5, &SearchOptions::new())
        .await
        .unwrap();

    assert!(outcome.documents.is_empty());
    assert_eq!(outcome.diagnostics.phase, SearchPhase::Empty);
    assert_eq!(outcome.diagnostics.failure_count(), 2);
}

#[tokio::test]
async fn test_hydration_miss_is_dropped_and_counted() {
    let sparse = MockBackend::new("bm25")
        .with_results(["u1", "u2"])
        .with_hydration(vec![Document::new("u2", "alpha")]);
    let retriever = Retriever::new(BackendSet::none().with_sparse(Arc::new(sparse)));

    let outcome = retriever
        .search_with_diagnostics("alpha", 5, &SearchOptions::new())
        .await
        .unwrap();

    assert_eq!(ids(&outcome.documents), vec!["u2"]);
    assert_eq!(outcome.diagnostics.hydration_misses, vec!["u1".to_string()]);
    assert_eq!(outcome.diagnostics.fused_candidates, 2);
}

#[tokio::test]
async fn test_dense_copy_wins_over_sparse() {
    let dense =
        MockBackend::new("vectors").with_documents(vec![Document::new("a", "dense copy")]);
    let sparse = MockBackend::new("bm25").with_documents(vec![
        Document::new("a", "sparse copy"),
        Document::new("b", "only sparse"),
    ]);
    let retriever = retriever(dense.clone(), sparse.clone());

    let docs = retriever
        .search("query", 5, &SearchOptions::new().with_rerank(false))
        .await
        .unwrap();

    assert_eq!(ids(&docs), vec!["a", "b"]);
    assert_eq!(docs[0].text, "dense copy");
    assert_eq!(dense.hydrate_calls(), 1);
    assert_eq!(sparse.hydrate_calls(), 1);
}

/// Hydrates every requested ID with the first ranked document.
#[derive(Debug)]
struct MislabeledBackend;

#[async_trait]
impl SearchBackend for MislabeledBackend {
    fn name(&self) -> &str {
        "mislabeled"
    }

    async fn search(&self, _query: &str, _k: usize) -> aurora_retrieval::Result<RankedList> {
        Ok(vec!["a".to_string(), "b".to_string()])
    }

    async fn hydrate(
        &self,
        ids: &[DocumentId],
    ) -> aurora_retrieval::Result<HashMap<DocumentId, Document>> {
        Ok(ids
            .iter()
            .map(|id| (id.clone(), Document::new("b", "always b")))
            .collect())
    }
}

impl SparseBackend for MislabeledBackend {}

#[tokio::test]
async fn test_hydrated_document_with_wrong_id_is_dropped() {
    let retriever = Retriever::new(BackendSet::none().with_sparse(Arc::new(MislabeledBackend)));

    let outcome = retriever
        .search_with_diagnostics("query", 5, &SearchOptions::new().with_rerank(false))
        .await
        .unwrap();

    assert_eq!(ids(&outcome.documents), vec!["b"]);
    assert_eq!(outcome.diagnostics.hydration_misses, vec!["a".to_string()]);
}

// =========== Concurrency ===========

#[tokio::test(start_paused = true)]
async fn test_backends_search_concurrently() {
    let dense = MockBackend::new("vectors")
        .with_documents(vec![Document::new("a", "alpha")])
        .with_delay(Duration::from_millis(1500));
    let sparse = MockBackend::new("bm25")
        .with_documents(vec![Document::new("b", "beta")])
        .with_delay(Duration::from_millis(1500));
    let retriever = retriever(dense, sparse);

    let started = Instant::now();
    let outcome = retriever
        .search_with_diagnostics("query", 5, &SearchOptions::new().with_rerank(false))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(2), "searches ran in sequence: {elapsed:?}");
    assert_eq!(ids(&outcome.documents), vec!["a", "b"]);
    assert_eq!(outcome.diagnostics.failure_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_backends_hydrate_concurrently() {
    let dense = MockBackend::new("vectors")
        .with_documents(vec![Document::new("a", "alpha")])
        .with_hydrate_delay(Duration::from_millis(1500));
    let sparse = MockBackend::new("bm25")
        .with_documents(vec![Document::new("b", "beta")])
        .with_hydrate_delay(Duration::from_millis(1500));
    let retriever = retriever(dense.clone(), sparse.clone());

    let started = Instant::now();
    let outcome = retriever
        .search_with_diagnostics("query", 5, &SearchOptions::new().with_rerank(false))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(2), "hydration ran in sequence: {elapsed:?}");
    assert_eq!(ids(&outcome.documents), vec!["a", "b"]);
    assert_eq!(outcome.diagnostics.failure_count(), 0);
    assert_eq!(dense.hydrate_calls(), 1);
    assert_eq!(sparse.hydrate_calls(), 1);
}

// =========== Empty and degenerate inputs ===========

#[tokio::test]
async fn test_zero_backends_returns_empty() {
    let retriever = Retriever::new(BackendSet::none());

    for query in ["OtherCo", "", "   "] {
        for top_n in [0, 1, 10] {
            let outcome = retriever
                .search_with_diagnostics(query, top_n, &SearchOptions::new())
                .await
                .unwrap();
            assert!(outcome.documents.is_empty());
            assert_eq!(outcome.diagnostics.phase, SearchPhase::Empty);
        }
    }
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let retriever = retriever(MockBackend::new("vectors"), sparse_news());

    for query in ["", "  \t "] {
        let err = retriever
            .search(query, 3, &SearchOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidArgument(_)));
    }
}

#[tokio::test]
async fn test_top_n_zero_skips_backends() {
    let sparse = sparse_news();
    let retriever = Retriever::new(BackendSet::none().with_sparse(Arc::new(sparse.clone())));

    let docs = retriever.search("OtherCo", 0, &SearchOptions::new()).await.unwrap();

    assert!(docs.is_empty());
    assert_eq!(sparse.search_calls(), 0);
}

#[tokio::test]
async fn test_invalid_overrides_are_rejected() {
    let retriever = retriever(MockBackend::new("vectors"), sparse_news());

    let err = retriever
        .search("OtherCo", 2, &SearchOptions::new().with_fusion_k(0))
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::InvalidArgument(_)));

    let err = retriever
        .search("OtherCo", 2, &SearchOptions::new().with_candidate_pool(0))
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::InvalidArgument(_)));
}

// =========== Options ===========

#[tokio::test]
async fn test_candidate_pool_is_passed_to_backends() {
    let sparse = sparse_news();
    let retriever = Retriever::new(BackendSet::none().with_sparse(Arc::new(sparse.clone())));

    retriever.search("OtherCo", 2, &SearchOptions::new()).await.unwrap();
    assert_eq!(sparse.last_k(), 20);

    retriever.search("OtherCo", 10, &SearchOptions::new()).await.unwrap();
    assert_eq!(sparse.last_k(), 40);

    retriever
        .search("OtherCo", 2, &SearchOptions::new().with_candidate_pool(7))
        .await
        .unwrap();
    assert_eq!(sparse.last_k(), 7);
}

#[tokio::test]
async fn test_disabled_backend_is_not_called() {
    let dense = MockBackend::new("vectors").with_documents(vec![Document::new("u1", "OtherCo")]);
    let retriever = retriever(dense.clone(), sparse_news());

    let docs = retriever
        .search("OtherCo", 5, &SearchOptions::new().with_dense(false))
        .await
        .unwrap();

    assert_eq!(ids(&docs), vec!["u4", "u5"]);
    assert_eq!(dense.search_calls(), 0);
    assert_eq!(dense.hydrate_calls(), 0);
}

#[tokio::test]
async fn test_rerank_reorders_fused_pool() {
    let dense = MockBackend::new("vectors").with_documents(vec![
        Document::new("d1", "gamma delta"),
        Document::new("d2", "alpha beta"),
    ]);
    let retriever = Retriever::new(BackendSet::none().with_dense(Arc::new(dense)));

    let outcome = retriever
        .search_with_diagnostics("alpha", 2, &SearchOptions::new())
        .await
        .unwrap();
    assert_eq!(ids(&outcome.documents), vec!["d2", "d1"]);
    assert!(outcome.diagnostics.reranked);

    let docs = retriever
        .search("alpha", 2, &SearchOptions::new().with_rerank(false))
        .await
        .unwrap();
    assert_eq!(ids(&docs), vec!["d1", "d2"]);
}

#[tokio::test]
async fn test_rerank_skipped_when_documents_have_no_text() {
    let dense = MockBackend::new("vectors").with_documents(vec![
        Document::new("d1", ""),
        Document::new("d2", ""),
    ]);
    let retriever = Retriever::new(BackendSet::none().with_dense(Arc::new(dense)));

    let outcome = retriever
        .search_with_diagnostics("alpha", 2, &SearchOptions::new())
        .await
        .unwrap();
    assert_eq!(ids(&outcome.documents), vec!["d1", "d2"]);
    assert!(!outcome.diagnostics.reranked);
}

#[tokio::test]
async fn test_fallback_documents_when_backends_return_nothing() {
    let retriever = retriever(MockBackend::new("vectors"), MockBackend::new("bm25"));
    let fallback = vec![
        Document::new("f1", "gamma"),
        Document::new("f2", "alpha"),
        Document::new("f1", "duplicate"),
    ];

    let outcome = retriever
        .search_with_diagnostics(
            "alpha",
            5,
            &SearchOptions::new().with_fallback_documents(fallback),
        )
        .await
        .unwrap();
    assert_eq!(ids(&outcome.documents), vec!["f2", "f1"]);
    assert_eq!(outcome.documents[1].text, "gamma");
    assert!(outcome.diagnostics.used_fallback);

    let outcome = retriever
        .search_with_diagnostics("alpha", 5, &SearchOptions::new())
        .await
        .unwrap();
    assert!(outcome.documents.is_empty());
    assert_eq!(outcome.diagnostics.phase, SearchPhase::Empty);
}

// =========== Configuration and composition ===========

#[tokio::test]
async fn test_with_config_validates() {
    let bad = RetrievalConfig::default().with_fusion_k(0);
    let err = Retriever::with_config(BackendSet::none(), bad).unwrap_err();
    assert!(matches!(err, RetrievalError::Config(_)));

    let config = RetrievalConfig::default().with_fusion_k(1);
    let retriever = Retriever::with_config(BackendSet::none(), config).unwrap();
    assert_eq!(retriever.config().fusion_k, 1);
}

#[derive(Debug)]
struct ReverseReranker;

impl Reranker for ReverseReranker {
    fn name(&self) -> &str {
        "reverse"
    }

    fn rerank_scored(
        &self,
        _query: &str,
        documents: &[Document],
        top_k: usize,
    ) -> Vec<ScoredDocument> {
        documents
            .iter()
            .rev()
            .take(top_k)
            .map(|d| ScoredDocument {
                document: d.clone(),
                score: 0.0,
            })
            .collect()
    }
}

#[tokio::test]
async fn test_custom_reranker() {
    let retriever = Retriever::new(BackendSet::none().with_sparse(Arc::new(sparse_news())))
        .with_reranker(Arc::new(ReverseReranker));

    let docs = retriever
        .search("OtherCo", 2, &SearchOptions::new().with_rerank(true))
        .await
        .unwrap();
    assert_eq!(ids(&docs), vec!["u5", "u4"]);
}

#[tokio::test]
async fn test_bm25_sparse_backend_end_to_end() {
    let corpus = vec![
        Document::new("n1", "ExampleAI closes seed round"),
        Document::new("n2", "OtherCo raises Series B led by Acme Ventures"),
        Document::new("n3", "Weather update for the weekend"),
    ];
    let sparse = Bm25Backend::new(corpus).with_name("bm25-memory");
    let retriever = Retriever::new(BackendSet::none().with_sparse(Arc::new(sparse)));

    let docs = retriever
        .search("series b funding", 3, &SearchOptions::new())
        .await
        .unwrap();

    assert_eq!(ids(&docs), vec!["n2"]);
}

#[tokio::test]
async fn test_diagnostics_serialize() {
    let retriever = retriever(
        MockBackend::new("vectors").unavailable("connection refused"),
        sparse_news(),
    );
    let outcome = retriever
        .search_with_diagnostics("OtherCo", 1, &SearchOptions::new())
        .await
        .unwrap();

    let json = serde_json::to_value(&outcome.diagnostics).unwrap();
    assert_eq!(json["phase"], "returned");
    assert_eq!(json["backend_failures"][0]["kind"], "dense");
    assert_eq!(json["backend_failures"][0]["reason"]["kind"], "unavailable");
}
