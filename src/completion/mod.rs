//! Backends that turn a transcript into one reply from a remote model.
//!
//! Every backend replays the whole transcript on each call. There is no
//! truncation, no retry and no caching; one call per submission.

use crate::session::Message;
use async_trait::async_trait;
use thiserror::Error;

pub mod demo;
pub mod gemini;
pub mod openai;

pub use demo::DemoClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum CompletionError {
    /// No response was received.
    #[error("transport failure: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("api error: {0}")]
    Api(String),
}

impl CompletionError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Short label shown in the header and logs.
    fn name(&self) -> &str;

    async fn complete(&self, transcript: &[Message]) -> Result<String, CompletionError>;
}

/// Reads the body of a non-2xx response into a `Status` error.
pub(crate) async fn status_error(response: reqwest::Response) -> CompletionError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    CompletionError::Status { status, body }
}

pub(crate) fn trim_base_url(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::{trim_base_url, CompletionError};

    #[test]
    fn only_transport_failures_count_as_network() {
        let status = CompletionError::Status {
            status: 500,
            body: String::new(),
        };
        assert!(!status.is_network());
        assert!(!CompletionError::Malformed("no choices".into()).is_network());
    }

    #[test]
    fn trim_base_url_drops_trailing_slashes() {
        assert_eq!(trim_base_url("http://localhost:8080//"), "http://localhost:8080");
        assert_eq!(trim_base_url("http://localhost:8080"), "http://localhost:8080");
    }
}
