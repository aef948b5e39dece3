use crate::error::RagError;
use crate::models::{EmbeddingVector, RetrievedItem, TopK};
use crate::prompt::Prompt;

/// Turns a user query into an embedding in the same space as the indexed chunks.
pub trait QueryEmbedder {
    fn embed_query(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<EmbeddingVector, RagError>> + Send;
}

/// Nearest-neighbour lookup against an already-populated index.
///
/// Implementations return matches in the store's order and never re-rank.
pub trait VectorIndex {
    fn nearest(
        &self,
        vector: &EmbeddingVector,
        top_k: TopK,
    ) -> impl std::future::Future<Output = Result<Vec<RetrievedItem>, RagError>> + Send;
}

pub trait TextGenerator {
    fn generate(
        &self,
        prompt: &Prompt,
    ) -> impl std::future::Future<Output = Result<String, RagError>> + Send;
}
