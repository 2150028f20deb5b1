//! Candidate sources for entity detection.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::Result;
use crate::types::Candidate;

/// Supplies the known companies that text is matched against.
///
/// The host decides where candidates come from (a database table, a cache,
/// a fixture). The detector only ever sees this capability.
#[async_trait]
pub trait CandidateSource: Send + Sync + Debug {
    /// List every candidate, in a stable order.
    ///
    /// Order matters: it breaks ties between equally scored candidates.
    /// Failures should be reported as
    /// [`RetrievalError::CandidateSource`](crate::RetrievalError::CandidateSource).
    async fn list(&self) -> Result<Vec<Candidate>>;
}

/// In-memory candidate list.
///
/// # Example
///
/// ```
/// use aurora_retrieval::StaticCandidates;
///
/// let source = StaticCandidates::from_pairs([(1, "ExampleAI"), (2, "OtherCo")]);
/// assert_eq!(source.len(), 2);
/// assert!(!source.is_empty());
/// assert!(StaticCandidates::default().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCandidates {
    candidates: Vec<Candidate>,
}

impl StaticCandidates {
    /// Wrap an existing list.
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Build from `(id, name)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self::new(pairs.into_iter().map(Candidate::from).collect())
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the list has no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[async_trait]
impl CandidateSource for StaticCandidates {
    async fn list(&self) -> Result<Vec<Candidate>> {
        Ok(self.candidates.clone())
    }
}
