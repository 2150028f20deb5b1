//! Rank fusion and reranking.
//!
//! Two pure stages sit between the backends and the caller:
//!
//! ```ascii
//!   dense ids ──┐
//!               ├──► RRF fusion ──► hydration ──► TokenReranker ──► top_n
//!  sparse ids ──┘
//! ```
//!
//! Neither stage performs I/O.
//!
//! # Module Structure
//!
//! ```ascii
//! reranker/
//! ├── mod.rs           ─► This file (re-exports)
//! ├── rrf.rs           ─► RrfFuser, rrf_fuse, FusedScores
//! ├── traits.rs        ─► Reranker trait
//! ├── result.rs        ─► ScoredDocument
//! ├── idf.rs           ─► IdfSource, UniformIdf, CorpusIdf
//! └── token_overlap.rs ─► TokenReranker, token_rerank
//! ```

mod idf;
mod result;
mod rrf;
mod token_overlap;
mod traits;

pub use idf::{CorpusIdf, IdfSource, UniformIdf};
pub use result::ScoredDocument;
pub use rrf::{rrf_fuse, rrf_fuse_pair, rrf_scores, FusedScores, RrfFuser, DEFAULT_RRF_K};
pub use token_overlap::{token_rerank, TokenReranker, DEFAULT_TAG_BOOST};
pub use traits::Reranker;
