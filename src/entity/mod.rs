//! Company entity detection.
//!
//! ```ascii
//!  CandidateSource::list() ──► [(id, name), ...]
//!                                   │ score_candidate(name, text)
//!                                   ▼
//!                      sort desc (stable) ─► drop <= 0 ─► dedupe ─► top_k
//! ```

mod detector;
mod source;

pub use detector::{score_candidate, EntityDetector, PREFIX_BONUS, SUBSTRING_BONUS};
pub use source::{CandidateSource, StaticCandidates};
