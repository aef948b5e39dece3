use crate::config::Config;
use crate::http::{describe_transport_error, error_body};
use domain::error::RagError;
use domain::models::EmbeddingVector;
use domain::ports::{QueryEmbedder, TextGenerator};
use domain::prompt::Prompt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Declared use of an embedding. Queries and indexed documents share one space,
/// but the provider may weight them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalQuery,
    RetrievalDocument,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content,
    task_type: TaskType,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Client for the Gemini embedding and generation endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    embed_model: String,
    chat_model: String,
}

impl GeminiClient {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            api_key: config.genie_api_key.clone(),
            embed_model: model_path(&config.embed_model),
            chat_model: model_path(&config.chat_model),
        }
    }

    fn api_key(&self) -> Result<&str, RagError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| RagError::missing_setting("GENIE_API_KEY"))
    }

    pub async fn embed_content(
        &self,
        text: &str,
        task_type: TaskType,
    ) -> Result<EmbeddingVector, RagError> {
        let api_key = self.api_key()?;
        let url = format!("{}/{}:embedContent", self.base_url, self.embed_model);
        let request = EmbedContentRequest {
            model: &self.embed_model,
            content: Content {
                role: None,
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
            task_type,
        };
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Retrieval(describe_transport_error("Gemini embedding", &e)))?;
        if !response.status().is_success() {
            return Err(RagError::Retrieval(format!(
                "Gemini embedding API error: {}",
                error_body(response).await
            )));
        }
        let embed_response: EmbedContentResponse = response.json().await.map_err(|e| {
            RagError::Retrieval(format!("malformed Gemini embedding response: {e}"))
        })?;
        if embed_response.embedding.values.is_empty() {
            return Err(RagError::Retrieval(
                "Gemini returned an empty embedding".to_string(),
            ));
        }
        Ok(EmbeddingVector::new(embed_response.embedding.values))
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String, RagError> {
        let api_key = self.api_key()?;
        let url = format!("{}/{}:generateContent", self.base_url, self.chat_model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Generation(describe_transport_error("Gemini generation", &e)))?;
        if !response.status().is_success() {
            return Err(RagError::Generation(format!(
                "Gemini generation API error: {}",
                error_body(response).await
            )));
        }
        let generated: GenerateContentResponse = response.json().await.map_err(|e| {
            RagError::Generation(format!("malformed Gemini generation response: {e}"))
        })?;
        primary_text(generated)
    }
}

/// Joins the text parts of the first candidate.
fn primary_text(response: GenerateContentResponse) -> Result<String, RagError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(RagError::Generation(format!("Gemini returned no answer: {reason}")));
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(RagError::Unexpected(format!(
            "Gemini candidate has no text (finish reason: {reason})"
        )));
    }
    Ok(text)
}

/// Gemini REST paths address models as `models/<name>`.
fn model_path(name: &str) -> String {
    if name.starts_with("models/") || name.starts_with("tunedModels/") {
        name.to_string()
    } else {
        format!("models/{name}")
    }
}

impl QueryEmbedder for GeminiClient {
    async fn embed_query(&self, text: &str) -> Result<EmbeddingVector, RagError> {
        self.embed_content(text, TaskType::RetrievalQuery).await
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, RagError> {
        self.generate_content(prompt.as_str()).await
    }
}
