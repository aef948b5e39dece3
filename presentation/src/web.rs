use anyhow::Context;
use application::rag_service::RagService;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use domain::error::{ErrorKind, RagError};
use domain::ports::{QueryEmbedder, TextGenerator, VectorIndex};
use infrastructure::config::Config;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::types::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Values the page needs to draw its controls, plus what `/health` reports.
#[derive(Debug, Clone, Serialize)]
pub struct UiSettings {
    pub max_top_k: usize,
    pub default_top_k: usize,
    #[serde(skip)]
    pub index_name: String,
    #[serde(skip)]
    pub environment: String,
}

impl UiSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_top_k: config.max_top_k,
            default_top_k: config.default_top_k,
            index_name: config.pinecone_index_name.clone(),
            environment: config.pinecone_environment.clone(),
        }
    }
}

pub struct AppState<E, S, G> {
    pub service: RagService<E, S, G>,
    pub settings: UiSettings,
}

impl<E, S, G> AppState<E, S, G> {
    pub fn new(service: RagService<E, S, G>, settings: UiSettings) -> Self {
        Self { service, settings }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub query: String,
    pub top_k: Option<i64>,
    #[serde(default)]
    pub show_context: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub contexts: Vec<String>,
}

/// A workflow failure rendered as `{ "error", "kind" }` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub RagError);

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Retrieval | ErrorKind::Generation => StatusCode::BAD_GATEWAY,
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.to_string(),
            "kind": self.0.kind().as_str(),
        }));
        (self.status(), body).into_response()
    }
}

pub fn router<E, S, G>(state: Arc<AppState<E, S, G>>) -> Router
where
    E: QueryEmbedder + Send + Sync + 'static,
    S: VectorIndex + Send + Sync + 'static,
    G: TextGenerator + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health::<E, S, G>))
        .route("/api/settings", get(settings::<E, S, G>))
        .route("/api/answer", post(answer::<E, S, G>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve<E, S, G>(state: Arc<AppState<E, S, G>>, addr: &str) -> Result<()>
where
    E: QueryEmbedder + Send + Sync + 'static,
    S: VectorIndex + Send + Sync + 'static,
    G: TextGenerator + Send + Sync + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(
        "PDF RAG Summarizer listening on http://{} (index '{}')",
        listener.local_addr()?,
        state.settings.index_name
    );
    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health<E, S, G>(State(state): State<Arc<AppState<E, S, G>>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "index": state.settings.index_name,
        "environment": state.settings.environment,
    }))
}

async fn settings<E, S, G>(State(state): State<Arc<AppState<E, S, G>>>) -> Json<UiSettings> {
    Json(state.settings.clone())
}

async fn answer<E, S, G>(
    State(state): State<Arc<AppState<E, S, G>>>,
    payload: std::result::Result<Json<AnswerRequest>, JsonRejection>,
) -> std::result::Result<Json<AnswerResponse>, ApiError>
where
    E: QueryEmbedder + Send + Sync + 'static,
    S: VectorIndex + Send + Sync + 'static,
    G: TextGenerator + Send + Sync + 'static,
{
    let Json(request) = payload.map_err(|e| RagError::InvalidInput(e.body_text()))?;
    let top_k = match request.top_k {
        // Negative values cannot be a valid count; 0 is rejected by the workflow.
        Some(k) => usize::try_from(k).unwrap_or(0),
        None => state.settings.default_top_k,
    };
    let result = state.service.answer(&request.query, top_k).await?;
    let contexts = if request.show_context {
        result.contexts
    } else {
        Vec::new()
    };
    Ok(Json(AnswerResponse {
        answer: result.answer,
        contexts,
    }))
}
