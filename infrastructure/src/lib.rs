pub mod config;
pub mod gemini_client;
pub mod http;
pub mod pinecone_client;
