//! Retrieval configuration.
//!
//! TOML-backed tunables for fusion, candidate pooling, deadlines and token
//! scoring.
//!
//! # Configuration File Location
//!
//! [`RetrievalConfig::load`] looks in order of priority at:
//! 1. The file named by the `AURORA_RETRIEVAL_CONFIG` environment variable
//! 2. `./aurora-retrieval.toml` (current working directory)
//! 3. Built-in defaults
//!
//! # Example Configuration
//!
//! ```toml
//! fusion_k = 60
//! candidate_pool_multiplier = 4
//! candidate_pool_min = 20
//! per_backend_deadline_ms = 2000
//! global_deadline_ms = 5000
//! tag_boost = 1.5
//! stoplist = ["the", "a", "an", "and", "or", "of", "to", "in", "on", "for"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::tokenizer::{Tokenizer, DEFAULT_STOPLIST};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "AURORA_RETRIEVAL_CONFIG";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "aurora-retrieval.toml";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse or serialize TOML.
    #[error("Failed to parse TOML config: {0}")]
    ParseError(String),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// ============================================================================
// Retrieval Configuration
// ============================================================================

/// Tunables for the retrieval core.
///
/// Every field has a default, so a partial TOML file only overrides what it
/// names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// RRF smoothing constant `k` (≥ 1).
    pub fusion_k: u32,

    /// Per-backend candidate pool is `top_n × multiplier` (≥ 1)...
    pub candidate_pool_multiplier: usize,

    /// ...but never smaller than this (≥ 1).
    pub candidate_pool_min: usize,

    /// Deadline for each individual backend call, in milliseconds.
    pub per_backend_deadline_ms: u64,

    /// Deadline for the dispatch phase of a search, in milliseconds.
    pub global_deadline_ms: u64,

    /// Weight of a tag token relative to a body token in the token reranker.
    pub tag_boost: f64,

    /// Function words removed by the tokenizer.
    pub stoplist: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            fusion_k: 60,
            candidate_pool_multiplier: 4,
            candidate_pool_min: 20,
            per_backend_deadline_ms: 2000,
            global_deadline_ms: 5000,
            tag_boost: 1.5,
            stoplist: DEFAULT_STOPLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RetrievalConfig {
    /// Load configuration from the standard locations, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if Path::new(&path).exists() {
                return Self::from_file(&path);
            }
            tracing::warn!(path = %path, "{} points at a missing file, ignoring", CONFIG_ENV_VAR);
        }

        let local_path = Path::new(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            return Self::from_file(local_path);
        }

        tracing::debug!("No retrieval config file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Check every value is within range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fusion_k < 1 {
            return Err(ConfigError::ValidationError(
                "fusion_k must be >= 1".to_string(),
            ));
        }
        if self.candidate_pool_multiplier < 1 {
            return Err(ConfigError::ValidationError(
                "candidate_pool_multiplier must be >= 1".to_string(),
            ));
        }
        if self.candidate_pool_min < 1 {
            return Err(ConfigError::ValidationError(
                "candidate_pool_min must be >= 1".to_string(),
            ));
        }
        if !self.tag_boost.is_finite() || self.tag_boost < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "tag_boost must be a finite non-negative number, got {}",
                self.tag_boost
            )));
        }
        Ok(())
    }

    /// Set the RRF `k`.
    pub fn with_fusion_k(mut self, k: u32) -> Self {
        self.fusion_k = k;
        self
    }

    /// Set the per-backend deadline.
    pub fn with_per_backend_deadline(mut self, deadline: Duration) -> Self {
        self.per_backend_deadline_ms = deadline.as_millis() as u64;
        self
    }

    /// Set the global dispatch deadline.
    pub fn with_global_deadline(mut self, deadline: Duration) -> Self {
        self.global_deadline_ms = deadline.as_millis() as u64;
        self
    }

    /// Set the tag boost.
    pub fn with_tag_boost(mut self, boost: f64) -> Self {
        self.tag_boost = boost;
        self
    }

    /// Replace the stoplist.
    pub fn with_stoplist<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stoplist = words.into_iter().map(Into::into).collect();
        self
    }

    /// Per-backend deadline as a [`Duration`].
    pub fn per_backend_deadline(&self) -> Duration {
        Duration::from_millis(self.per_backend_deadline_ms)
    }

    /// Global dispatch deadline as a [`Duration`].
    pub fn global_deadline(&self) -> Duration {
        Duration::from_millis(self.global_deadline_ms)
    }

    /// Candidate pool for a request: `max(top_n × multiplier, min)`.
    pub fn candidate_pool(&self, top_n: usize) -> usize {
        top_n
            .saturating_mul(self.candidate_pool_multiplier)
            .max(self.candidate_pool_min)
    }

    /// Tokenizer using this configuration's stoplist.
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::with_stoplist(self.stoplist.iter().cloned())
    }
}
