use domain::error::RagError;
use domain::models::{Query, RagAnswer, TopK};
use domain::ports::{QueryEmbedder, TextGenerator, VectorIndex};
use domain::prompt::build_prompt;
use infrastructure::{
    config::Config, gemini_client::GeminiClient, http::build_http_client,
    pinecone_client::PineconeIndex,
};
use shared::telemetry::Telemetry;
use shared::utils::preview;

/// The production wiring: Gemini for embeddings and answers, Pinecone for retrieval.
pub type LiveRagService = RagService<GeminiClient, PineconeIndex, GeminiClient>;

/// Retrieval-augmented answering over an already-populated index.
///
/// Holds only read-only collaborators, so one instance serves concurrent requests.
pub struct RagService<E, S, G> {
    embedder: E,
    index: S,
    generator: G,
    max_top_k: usize,
}

impl LiveRagService {
    pub fn from_config(config: &Config) -> Result<Self, RagError> {
        let client = build_http_client(config.request_timeout)?;
        let gemini = GeminiClient::new(config, client.clone());
        let index = PineconeIndex::new(config, client);
        Ok(Self::new(gemini.clone(), index, gemini, config.max_top_k))
    }

    pub fn index(&self) -> &PineconeIndex {
        &self.index
    }
}

impl<E, S, G> RagService<E, S, G>
where
    E: QueryEmbedder,
    S: VectorIndex,
    G: TextGenerator,
{
    pub fn new(embedder: E, index: S, generator: G, max_top_k: usize) -> Self {
        Self {
            embedder,
            index,
            generator,
            max_top_k,
        }
    }

    pub fn max_top_k(&self) -> usize {
        self.max_top_k
    }

    /// Embeds the question, fetches the `top_k` nearest chunks, and asks the
    /// generator to answer from them.
    ///
    /// Input is validated before any provider call. The first failing step ends
    /// the invocation; nothing partial is returned.
    pub async fn answer(&self, question: &str, top_k: usize) -> Result<RagAnswer, RagError> {
        let query = Query::parse(question)?;
        let top_k = TopK::new(top_k, self.max_top_k)?;
        tracing::debug!("RAG query (top_k={}): {}", top_k.get(), preview(query.as_str(), 80));

        let result = self.run(&query, top_k).await;
        if let Err(err) = &result {
            tracing::warn!("RAG query failed [{}]: {}", err.kind(), err);
        }
        result
    }

    async fn run(&self, query: &Query, top_k: TopK) -> Result<RagAnswer, RagError> {
        let mut timer = Telemetry::new();

        let vector = self.embedder.embed_query(query.as_str()).await?;
        let embed_ms = timer.lap_ms();

        let items = self.index.nearest(&vector, top_k).await?;
        if items.len() > top_k.get() {
            return Err(RagError::Retrieval(format!(
                "store returned {} matches for top_k={}",
                items.len(),
                top_k.get()
            )));
        }
        let contexts = items
            .iter()
            .map(|item| item.text().map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        let retrieve_ms = timer.lap_ms();

        let prompt = build_prompt(query.as_str(), &contexts);
        let answer = self.generator.generate(&prompt).await?;
        let generate_ms = timer.lap_ms();

        tracing::info!(
            "RAG answer: top_k={} contexts={} dims={} embed={}ms retrieve={}ms generate={}ms",
            top_k.get(),
            contexts.len(),
            vector.dimensions(),
            embed_ms,
            retrieve_ms,
            generate_ms
        );
        Ok(RagAnswer { contexts, answer })
    }
}
