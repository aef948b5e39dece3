use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use shared::utils::is_blank;

use crate::error::RagError;

/// Metadata key holding the chunk text of an indexed item.
pub const TEXT_METADATA_KEY: &str = "text";

/// A user question. Never empty or whitespace-only.
///
/// The text is kept exactly as typed; only validation looks at the trimmed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn parse(raw: &str) -> Result<Self, RagError> {
        if is_blank(raw) {
            return Err(RagError::InvalidInput(
                "query must not be empty or whitespace-only".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Number of neighbours requested from the vector store, `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopK(usize);

impl TopK {
    pub fn new(k: usize, max: usize) -> Result<Self, RagError> {
        if k == 0 || k > max {
            return Err(RagError::InvalidInput(format!(
                "top_k must be between 1 and {max}, got {k}"
            )));
        }
        Ok(Self(k))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// Query embedding as returned by the provider. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimensions(&self) -> usize {
        self.0.len()
    }
}

/// One nearest-neighbour match from the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedItem {
    pub id: String,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl RetrievedItem {
    /// Chunk text stored under the `text` metadata key.
    pub fn text(&self) -> Result<&str, RagError> {
        match self
            .metadata
            .as_ref()
            .and_then(|meta| meta.get(TEXT_METADATA_KEY))
        {
            Some(Value::String(text)) => Ok(text),
            Some(_) => Err(RagError::Retrieval(format!(
                "match '{}' has a non-string '{TEXT_METADATA_KEY}' metadata field",
                self.id
            ))),
            None => Err(RagError::Retrieval(format!(
                "match '{}' is missing the '{TEXT_METADATA_KEY}' metadata field",
                self.id
            ))),
        }
    }
}

/// Result of one workflow invocation: the contexts in retrieval order and the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagAnswer {
    pub contexts: Vec<String>,
    pub answer: String,
}
