use crate::config::Config;
use crate::http::{describe_transport_error, error_body};
use domain::error::RagError;
use domain::models::{EmbeddingVector, RetrievedItem, TopK};
use domain::ports::VectorIndex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";
const API_VERSION: &str = "2024-07";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RetrievedItem>,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

/// Handle to one Pinecone index, shared by all in-flight requests.
///
/// The data-plane host is looked up once through the control plane unless
/// `PINECONE_INDEX_HOST` pins it.
pub struct PineconeIndex {
    client: Client,
    api_key: Option<String>,
    index_name: String,
    environment: String,
    controller_url: String,
    host: OnceCell<String>,
}

impl PineconeIndex {
    pub fn new(config: &Config, client: Client) -> Self {
        let host = match config.pinecone_index_host.as_deref() {
            Some(pinned) => OnceCell::new_with(Some(normalize_host(pinned))),
            None => OnceCell::new(),
        };
        Self {
            client,
            api_key: config.pinecone_api_key.clone(),
            index_name: config.pinecone_index_name.clone(),
            environment: config.pinecone_environment.clone(),
            controller_url: config.pinecone_controller_url.trim_end_matches('/').to_string(),
            host,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn api_key(&self) -> Result<&str, RagError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| RagError::missing_setting("PINECONE_API_KEY"))
    }

    async fn host(&self) -> Result<&str, RagError> {
        let host = self.host.get_or_try_init(|| self.describe_host()).await?;
        Ok(host.as_str())
    }

    async fn describe_host(&self) -> Result<String, RagError> {
        let api_key = self.api_key()?;
        let url = format!("{}/indexes/{}", self.controller_url, self.index_name);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .header(API_VERSION_HEADER, API_VERSION)
            .send()
            .await
            .map_err(|e| RagError::Retrieval(describe_transport_error("Pinecone control plane", &e)))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RagError::Retrieval(format!(
                "Pinecone index '{}' does not exist",
                self.index_name
            )));
        }
        if !response.status().is_success() {
            return Err(RagError::Retrieval(format!(
                "Pinecone describe_index error: {}",
                error_body(response).await
            )));
        }
        let described: DescribeIndexResponse = response.json().await.map_err(|e| {
            RagError::Retrieval(format!("malformed Pinecone describe_index response: {e}"))
        })?;
        tracing::info!(
            "Resolved Pinecone index '{}' ({}) to {}",
            self.index_name,
            self.environment,
            described.host
        );
        Ok(normalize_host(&described.host))
    }

    /// Nearest-neighbour query; matches come back in the store's order.
    pub async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<RetrievedItem>, RagError> {
        let api_key = self.api_key()?;
        let url = format!("{}/query", self.host().await?);
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata,
            include_values: false,
        };
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .header(API_VERSION_HEADER, API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Retrieval(describe_transport_error("Pinecone query", &e)))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RagError::Retrieval(format!(
                "Pinecone index '{}' was not found at its host",
                self.index_name
            )));
        }
        if !response.status().is_success() {
            return Err(RagError::Retrieval(format!(
                "Pinecone query error: {}",
                error_body(response).await
            )));
        }
        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| RagError::Retrieval(format!("malformed Pinecone query response: {e}")))?;
        Ok(result.matches)
    }
}

impl VectorIndex for PineconeIndex {
    async fn nearest(
        &self,
        vector: &EmbeddingVector,
        top_k: TopK,
    ) -> Result<Vec<RetrievedItem>, RagError> {
        self.query(vector.as_slice(), top_k.get(), true).await
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
