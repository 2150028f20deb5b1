//! Aurora Retrieval - Hybrid Retrieval Core
//!
//! Fuses ranked results from a dense (vector) backend and a sparse (lexical)
//! backend with Reciprocal Rank Fusion, reranks by query-token overlap, and
//! detects company mentions in free text.
//!
//! This crate provides:
//! - Text tokenization shared by every scorer
//! - Backend capabilities and a [`BackendSet`] describing which are present
//! - RRF fusion and a token overlap reranker (pure, no I/O)
//! - A deadline-bounded [`Retriever`] with per-search diagnostics
//! - An [`EntityDetector`] over a host-supplied [`CandidateSource`]
//!
//! # Components
//!
//! | Component | Module | Async | Notes |
//! |-----------|--------|-------|-------|
//! | Tokenizer | [`tokenizer`] | | NFKD folding, stoplist |
//! | Backends | [`backend`] | ✓ | `MockBackend`, in-memory `Bm25Backend` |
//! | RRF fuser | [`reranker`] | | `1 / (k + position + 1)` |
//! | Token reranker | [`reranker`] | | Tag boost, optional IDF |
//! | Retriever | [`retriever`] | ✓ | Concurrent dispatch, deadlines |
//! | Entity detector | [`entity`] | ✓ | Substring, overlap, prefix scoring |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use aurora_retrieval::{BackendSet, Document, MockBackend, Retriever, SearchOptions};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let dense = MockBackend::new("vectors").with_documents(vec![
//!     Document::new("u1", "ExampleAI closes seed round"),
//!     Document::new("u3", "ExampleAI and OtherCo partner"),
//! ]);
//! let sparse = MockBackend::new("bm25").with_documents(vec![
//!     Document::new("u3", "ExampleAI and OtherCo partner"),
//!     Document::new("u4", "OtherCo raises Series B"),
//! ]);
//! let retriever = Retriever::new(
//!     BackendSet::none()
//!         .with_dense(Arc::new(dense))
//!         .with_sparse(Arc::new(sparse)),
//! );
//!
//! let docs = retriever
//!     .search("ExampleAI OtherCo", 2, &SearchOptions::new().with_rerank(false))
//!     .await
//!     .unwrap();
//! assert_eq!(docs[0].id, "u3");
//! # });
//! ```
//!
//! # See Also
//!
//! - [`crate::retriever`] for the failure policy
//! - [`crate::config`] for configuration loading

pub mod backend;
pub mod config;
pub mod entity;
pub mod error;
pub mod reranker;
pub mod retriever;
pub mod tokenizer;
pub mod types;

pub use backend::{
    BackendKind, BackendSet, Bm25Backend, Bm25Config, DenseBackend, MockBackend, SearchBackend,
    SparseBackend,
};
pub use config::{ConfigError, RetrievalConfig};
pub use entity::{score_candidate, CandidateSource, EntityDetector, StaticCandidates};
pub use error::{Result, RetrievalError};
pub use reranker::{
    rrf_fuse, rrf_fuse_pair, rrf_scores, token_rerank, CorpusIdf, FusedScores, IdfSource,
    Reranker, RrfFuser, ScoredDocument, TokenReranker, UniformIdf, DEFAULT_RRF_K,
    DEFAULT_TAG_BOOST,
};
pub use retriever::{
    BackendFailure, BackendStage, FailureReason, Retriever, SearchDiagnostics, SearchOptions,
    SearchOutcome, SearchPhase,
};
pub use tokenizer::{tokenize, Tokenizer, DEFAULT_STOPLIST};
pub use types::{Candidate, Document, DocumentId, RankedList};
