use domain::error::RagError;
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client for all provider calls. The timeout bounds each request.
pub fn build_http_client(timeout: Duration) -> Result<Client, RagError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .build()
        .map_err(|e| RagError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Describes a transport error, calling out timeouts explicitly.
pub fn describe_transport_error(provider: &str, err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("{provider} request timed out")
    } else if err.is_connect() {
        format!("{provider} is unreachable: {err}")
    } else {
        format!("{provider} request failed: {err}")
    }
}

/// Reads the response body for an error message, keeping it short.
pub async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = shared::utils::preview(body.trim(), 300);
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    }
}
