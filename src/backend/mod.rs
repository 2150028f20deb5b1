//! Retrieval backends.
//!
//! The retriever talks to two optional collaborators: a dense (vector)
//! backend and a sparse (lexical) backend. Both satisfy the same
//! [`SearchBackend`] capability; the [`DenseBackend`] / [`SparseBackend`]
//! role traits say which slot of a [`BackendSet`] they may occupy.
//!
//! # Module Structure
//!
//! ```ascii
//! backend/
//! ├── mod.rs     ─► This file (re-exports)
//! ├── traits.rs  ─► SearchBackend, DenseBackend, SparseBackend, BackendKind
//! ├── set.rs     ─► BackendSet
//! ├── mock.rs    ─► MockBackend
//! └── bm25.rs    ─► Bm25Backend, Bm25Config
//! ```

mod bm25;
mod mock;
mod set;
mod traits;

pub use bm25::{Bm25Backend, Bm25Config};
pub use mock::MockBackend;
pub use set::BackendSet;
pub use traits::{BackendKind, DenseBackend, SearchBackend, SparseBackend};
