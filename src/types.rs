//! Core data types shared by every retrieval component.
//!
//! All of these are request-scoped values: backends produce them, the
//! retriever moves them through fusion and reranking, and the enclosing
//! service serializes them.

use serde::{Deserialize, Serialize};

/// Opaque document identifier, unique within a retrieval session.
pub type DocumentId = String;

/// Ranked document IDs, most relevant first, no duplicates.
///
/// Position is the only signal the fuser consumes.
pub type RankedList = Vec<DocumentId>;

/// A retrievable document as materialized by a backend.
///
/// # Example
///
/// ```
/// use aurora_retrieval::Document;
///
/// let doc = Document::new("acme-10k", "Acme Corp annual report")
///     .with_url("https://example.com/acme")
///     .with_tags(["filing", "annual"]);
/// assert_eq!(doc.tags.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier shared with the backend's ranked lists.
    pub id: DocumentId,
    /// Body text. May be empty.
    #[serde(default)]
    pub text: String,
    /// Source URL, when the backend knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Ordered tags. Tag tokens get a boost in the token reranker.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Document {
    /// Create a document with no URL and no tags.
    pub fn new(id: impl Into<DocumentId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            url: None,
            tags: Vec::new(),
        }
    }

    /// Set the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Replace the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A known company that free text can be matched against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Company ID.
    pub id: i64,
    /// Human-authored name, arbitrary case and punctuation.
    pub name: String,
}

impl Candidate {
    /// Create a candidate.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl<S: Into<String>> From<(i64, S)> for Candidate {
    fn from((id, name): (i64, S)) -> Self {
        Self::new(id, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_serializes_without_missing_url() {
        let doc = Document::new("1", "alpha beta");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["id"], "1");
        assert!(json.get("url").is_none());
        assert_eq!(json["tags"], serde_json::json!([]));
    }

    #[test]
    fn test_document_deserializes_with_defaults() {
        let doc: Document = serde_json::from_str(r#"{"id": "u9"}"#).unwrap();
        assert_eq!(doc, Document::new("u9", ""));
    }

    #[test]
    fn test_candidate_from_tuple() {
        let candidate: Candidate = (7, "ExampleAI").into();
        assert_eq!(candidate, Candidate::new(7, "ExampleAI"));
    }
}
