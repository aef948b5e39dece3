use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PINECONE_ENVIRONMENT: &str = "us-east1-gcp";
pub const DEFAULT_PINECONE_INDEX: &str = "pdf-embeddings";
pub const DEFAULT_PINECONE_CONTROLLER_URL: &str = "https://api.pinecone.io";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EMBED_MODEL: &str = "models/embedding-001";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_TOP_K: usize = 10;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";

/// Process-wide settings, read once at startup and never mutated.
///
/// API keys stay optional here; the client that needs one reports a
/// configuration error the first time it is used without it.
#[derive(Clone)]
pub struct Config {
    pub pinecone_api_key: Option<String>,
    pub pinecone_environment: String,
    pub pinecone_index_name: String,
    pub pinecone_index_host: Option<String>,
    pub pinecone_controller_url: String,
    pub genie_api_key: Option<String>,
    pub gemini_base_url: String,
    pub embed_model: String,
    pub chat_model: String,
    pub request_timeout: Duration,
    pub max_top_k: usize,
    pub default_top_k: usize,
    pub bind_addr: String,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn load() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let secret = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_top_k = parsed(&lookup, "RAG_MAX_TOP_K", DEFAULT_MAX_TOP_K).max(1);
        let default_top_k = parsed(&lookup, "RAG_DEFAULT_TOP_K", DEFAULT_TOP_K).clamp(1, max_top_k);
        let timeout_secs = parsed(&lookup, "RAG_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS).max(1);

        Self {
            pinecone_api_key: secret("PINECONE_API_KEY"),
            pinecone_environment: text("PINECONE_ENVIRONMENT", DEFAULT_PINECONE_ENVIRONMENT),
            pinecone_index_name: text("PINECONE_INDEX_NAME", DEFAULT_PINECONE_INDEX),
            pinecone_index_host: secret("PINECONE_INDEX_HOST"),
            pinecone_controller_url: text("PINECONE_CONTROLLER_URL", DEFAULT_PINECONE_CONTROLLER_URL),
            genie_api_key: secret("GENIE_API_KEY"),
            gemini_base_url: text("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            embed_model: text("RAG_EMBED_MODEL", DEFAULT_EMBED_MODEL),
            chat_model: text("RAG_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            request_timeout: Duration::from_secs(timeout_secs),
            max_top_k,
            default_top_k,
            bind_addr: text("RAG_BIND_ADDR", DEFAULT_BIND_ADDR),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parsed<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy + fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        _ => default,
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| if key.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Config")
            .field("pinecone_api_key", &redact(&self.pinecone_api_key))
            .field("pinecone_environment", &self.pinecone_environment)
            .field("pinecone_index_name", &self.pinecone_index_name)
            .field("pinecone_index_host", &self.pinecone_index_host)
            .field("pinecone_controller_url", &self.pinecone_controller_url)
            .field("genie_api_key", &redact(&self.genie_api_key))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("embed_model", &self.embed_model)
            .field("chat_model", &self.chat_model)
            .field("request_timeout", &self.request_timeout)
            .field("max_top_k", &self.max_top_k)
            .field("default_top_k", &self.default_top_k)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
