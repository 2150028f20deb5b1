//! Candidate scoring and the detector itself.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::source::CandidateSource;
use crate::error::{Result, RetrievalError};
use crate::tokenizer::Tokenizer;

/// Added when the whole name appears in the text.
pub const SUBSTRING_BONUS: f64 = 3.0;

/// Added when a text token of at least [`MIN_PREFIX_LEN`] chars starts a name token.
pub const PREFIX_BONUS: f64 = 0.25;

const MIN_PREFIX_LEN: usize = 3;

/// Detects which known companies a piece of text mentions.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use aurora_retrieval::{EntityDetector, StaticCandidates};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let source = StaticCandidates::from_pairs([(1, "ExampleAI"), (2, "OtherCo")]);
/// let detector = EntityDetector::new(Arc::new(source));
///
/// let ids = detector.detect_company_ids("Compare ExampleAI and OtherCo", 2).await.unwrap();
/// assert_eq!(ids, vec![1, 2]);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct EntityDetector {
    source: Arc<dyn CandidateSource>,
    tokenizer: Tokenizer,
}

impl EntityDetector {
    /// Create a detector over `source` with the default tokenizer.
    pub fn new(source: Arc<dyn CandidateSource>) -> Self {
        Self {
            source,
            tokenizer: Tokenizer::new(),
        }
    }

    /// Use a different tokenizer (e.g. a configured stoplist).
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Score one candidate name against `text` with this detector's tokenizer.
    pub fn score(&self, name: &str, text: &str) -> f64 {
        TextProfile::new(text, &self.tokenizer).score(name, &self.tokenizer)
    }

    /// Return up to `top_k` candidate IDs mentioned in `text`, best first.
    ///
    /// Equal scores keep the source's order. Candidates scoring zero are
    /// never returned, and each ID appears at most once.
    pub async fn detect_company_ids(&self, text: &str, top_k: usize) -> Result<Vec<i64>> {
        if top_k == 0 || text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.source.list().await.map_err(|err| {
            warn!(error = %err, "Candidate source failed");
            match err {
                err @ RetrievalError::CandidateSource(_) => err,
                other => RetrievalError::CandidateSource(other.to_string()),
            }
        })?;

        let profile = TextProfile::new(text, &self.tokenizer);
        let mut scored: Vec<(i64, f64)> = candidates
            .iter()
            .map(|c| (c.id, profile.score(&c.name, &self.tokenizer)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut seen = HashSet::new();
        let ids: Vec<i64> = scored
            .into_iter()
            .filter(|(id, _)| seen.insert(*id))
            .map(|(id, _)| id)
            .take(top_k)
            .collect();

        debug!(
            candidates = candidates.len(),
            detected = ids.len(),
            "Entity detection complete"
        );
        Ok(ids)
    }
}

/// Score a candidate name against `text` using the default tokenizer.
///
/// The score is the sum of:
/// - [`SUBSTRING_BONUS`] if the name occurs in the text (case-insensitive,
///   whitespace runs collapsed);
/// - the share of the name's distinct tokens present in the text;
/// - [`PREFIX_BONUS`] if a text token of three or more characters is a
///   prefix of some name token.
///
/// ```
/// use aurora_retrieval::score_candidate;
///
/// assert_eq!(score_candidate("ExampleAI", "news about exampleai"), 4.25);
/// assert_eq!(score_candidate("Acme Robotics", "acme"), 0.75);
/// assert_eq!(score_candidate("OtherCo", "nothing relevant"), 0.0);
/// ```
pub fn score_candidate(name: &str, text: &str) -> f64 {
    let tokenizer = Tokenizer::new();
    TextProfile::new(text, &tokenizer).score(name, &tokenizer)
}

/// The text side of scoring, computed once per detection.
struct TextProfile {
    collapsed: String,
    tokens: HashSet<String>,
}

impl TextProfile {
    fn new(text: &str, tokenizer: &Tokenizer) -> Self {
        Self {
            collapsed: collapse_whitespace(text),
            tokens: tokenizer.token_set(text),
        }
    }

    fn score(&self, name: &str, tokenizer: &Tokenizer) -> f64 {
        let mut score = 0.0;

        let needle = collapse_whitespace(name);
        if !needle.is_empty() && self.collapsed.contains(&needle) {
            score += SUBSTRING_BONUS;
        }

        let name_tokens = tokenizer.token_set(name);
        let overlap = name_tokens.intersection(&self.tokens).count();
        score += overlap as f64 / name_tokens.len().max(1) as f64;

        let has_prefix = self
            .tokens
            .iter()
            .filter(|t| t.chars().count() >= MIN_PREFIX_LEN)
            .any(|t| name_tokens.iter().any(|n| n.starts_with(t.as_str())));
        if has_prefix {
            score += PREFIX_BONUS;
        }

        score
    }
}

/// Lowercase and join whitespace-separated words with a single space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
