//! Reciprocal Rank Fusion (RRF).
//!
//! Combines ranked lists from heterogeneous backends without needing score
//! calibration between them.
//!
//! # Algorithm
//!
//! ```ascii
//! RRF Score(id) = Σ 1/(k + p + 1) over every list containing id
//!
//! Where:
//! - k = smoothing constant (default 60)
//! - p = 0-based position of id in that list
//! ```
//!
//! A larger `k` flattens the curve, so an ID present in several lists beats
//! an ID that sits at the very top of only one.
//!
//! # Determinism
//!
//! Equal aggregate scores are broken by first-seen order across the input
//! lists (list 0 first). Scores are accumulated in an insertion-ordered
//! vector, never by iterating a hash map.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, RetrievalError};
use crate::types::{DocumentId, RankedList};

/// Default smoothing constant from Cormack et al.
pub const DEFAULT_RRF_K: u32 = 60;

/// Aggregate RRF scores in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FusedScores {
    entries: Vec<(DocumentId, f64)>,
}

impl FusedScores {
    /// Score for `id`, if it appeared in any list.
    pub fn get(&self, id: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, score)| *score)
    }

    /// Number of distinct IDs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no ID was seen.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(id, score)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &(DocumentId, f64)> {
        self.entries.iter()
    }

    /// Sort by descending score (stable on first-seen order) and truncate.
    pub fn into_ranked(self, top_n: Option<usize>) -> RankedList {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(n) = top_n {
            entries.truncate(n);
        }
        entries.into_iter().map(|(id, _)| id).collect()
    }
}

/// Reciprocal Rank Fusion with a validated `k`.
///
/// # Example
///
/// ```
/// use aurora_retrieval::RrfFuser;
///
/// let fuser = RrfFuser::new();
/// let dense = vec!["u1".to_string(), "u2".to_string(), "u3".to_string()];
/// let sparse = vec!["u3".to_string(), "u4".to_string(), "u5".to_string()];
///
/// let fused = fuser.fuse_pair(&dense, &sparse, Some(3));
/// assert_eq!(fused[0], "u3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrfFuser {
    k: u32,
}

impl RrfFuser {
    /// Create a fuser with k=60.
    pub fn new() -> Self {
        Self { k: DEFAULT_RRF_K }
    }

    /// Create a fuser with a custom `k`. Fails when `k < 1`.
    pub fn with_k(k: u32) -> Result<Self> {
        if k < 1 {
            return Err(RetrievalError::invalid(format!(
                "RRF k must be >= 1, got {}",
                k
            )));
        }
        Ok(Self { k })
    }

    /// The smoothing constant.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Aggregate scores for `lists`.
    ///
    /// Only the first occurrence of an ID within a single list contributes.
    pub fn scores<L: AsRef<[DocumentId]>>(&self, lists: &[L]) -> FusedScores {
        let k = f64::from(self.k);
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<(DocumentId, f64)> = Vec::new();

        for list in lists {
            let mut seen_in_list: HashSet<&str> = HashSet::new();
            for (position, id) in list.as_ref().iter().enumerate() {
                if !seen_in_list.insert(id.as_str()) {
                    continue;
                }
                let contribution = 1.0 / (k + position as f64 + 1.0);
                match index.get(id.as_str()) {
                    Some(&slot) => entries[slot].1 += contribution,
                    None => {
                        index.insert(id.as_str(), entries.len());
                        entries.push((id.clone(), contribution));
                    }
                }
            }
        }

        FusedScores { entries }
    }

    /// Fuse `lists` into one ranked list, optionally truncated to `top_n`.
    pub fn fuse<L: AsRef<[DocumentId]>>(&self, lists: &[L], top_n: Option<usize>) -> RankedList {
        self.scores(lists).into_ranked(top_n)
    }

    /// Two-list form; identical to `fuse(&[dense, sparse], top_n)`.
    pub fn fuse_pair(
        &self,
        dense: &[DocumentId],
        sparse: &[DocumentId],
        top_n: Option<usize>,
    ) -> RankedList {
        self.fuse(&[dense, sparse], top_n)
    }
}

impl Default for RrfFuser {
    fn default() -> Self {
        Self::new()
    }
}

/// Fuse ranked lists with RRF.
///
/// Fails with [`RetrievalError::InvalidArgument`] when `k < 1`.
pub fn rrf_fuse<L: AsRef<[DocumentId]>>(
    lists: &[L],
    k: u32,
    top_n: Option<usize>,
) -> Result<RankedList> {
    Ok(RrfFuser::with_k(k)?.fuse(lists, top_n))
}

/// Fuse a dense and a sparse list with RRF (dense first).
pub fn rrf_fuse_pair(
    dense: &[DocumentId],
    sparse: &[DocumentId],
    k: u32,
    top_n: Option<usize>,
) -> Result<RankedList> {
    Ok(RrfFuser::with_k(k)?.fuse_pair(dense, sparse, top_n))
}

/// Aggregate RRF scores without ranking them.
pub fn rrf_scores<L: AsRef<[DocumentId]>>(lists: &[L], k: u32) -> Result<FusedScores> {
    Ok(RrfFuser::with_k(k)?.scores(lists))
}
