//! Google Gemini `generateContent` backend.
//!
//! The key travels in the `x-goog-api-key` header. Assistant turns are sent with
//! the `model` role, which is what the endpoint expects for prior replies.

use super::{status_error, trim_base_url, CompletionClient, CompletionError};
use crate::session::{Message, Sender};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Returned when the body parses but carries no candidate text.
pub const EMPTY_REPLY: &str = "⚠️ No response from Gemini AI.";

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn role(sender: Sender) -> &'static str {
        match sender {
            Sender::User => "user",
            Sender::Assistant => "model",
        }
    }

    fn build_request(transcript: &[Message]) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: transcript
                .iter()
                .map(|message| Content {
                    role: Self::role(message.sender),
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                })
                .collect(),
        }
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        format!(
            "{}/models/{model}:generateContent",
            trim_base_url(&self.base_url)
        )
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String, CompletionError> {
        if let Some(err) = response.error {
            return Err(CompletionError::Api(err.message));
        }

        let text = response
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .filter(|text| !text.is_empty());

        Ok(text.unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }
}

/// Transport errors carry the request URL; keep it out of logs.
fn redact(err: reqwest::Error) -> CompletionError {
    CompletionError::Network(err.without_url())
}

#[async_trait]
impl CompletionClient for GeminiClient {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn complete(&self, transcript: &[Message]) -> Result<String, CompletionError> {
        let request = Self::build_request(transcript);
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(redact)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let bytes = response.bytes().await.map_err(redact)?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|err| CompletionError::Malformed(err.to_string()))?;
        Self::extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn conversation() -> Vec<Message> {
        vec![
            Message::user("Hello"),
            Message::assistant("Hi there!"),
            Message::user("How are you?"),
        ]
    }

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key", DEFAULT_MODEL).with_base_url(server.uri())
    }

    #[test]
    fn request_maps_assistant_to_model_role() {
        let request = GeminiClient::build_request(&conversation());
        let value = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(
            value,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "Hello"}]},
                    {"role": "model", "parts": [{"text": "Hi there!"}]},
                    {"role": "user", "parts": [{"text": "How are you?"}]}
                ]
            })
        );
    }

    #[test]
    fn endpoint_accepts_prefixed_model_names() {
        let client = GeminiClient::new("k", "models/gemini-1.5-pro").with_base_url("http://host/v1beta/");
        assert_eq!(
            client.endpoint(),
            "http://host/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn complete_sends_full_history_and_returns_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_json(json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "Hello"}]},
                    {"role": "model", "parts": [{"text": "Hi there!"}]},
                    {"role": "user", "parts": [{"text": "How are you?"}]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    {"content": {"parts": [{"text": "Doing well."}]}},
                    {"content": {"parts": [{"text": "ignored"}]}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .complete(&conversation())
            .await
            .expect("completion should succeed");
        assert_eq!(reply, "Doing well.");
    }

    #[tokio::test]
    async fn missing_candidate_falls_back_to_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .complete(&conversation())
            .await
            .expect("empty candidate list is not an error");
        assert_eq!(reply, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&conversation())
            .await
            .expect_err("400 should fail");
        match err {
            CompletionError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("API key not valid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&conversation())
            .await
            .expect_err("html body should fail");
        assert!(matches!(err, CompletionError::Malformed(_)));
    }

    #[tokio::test]
    async fn error_object_in_body_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"error": {"message": "quota exceeded"}})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&conversation())
            .await
            .expect_err("error body should fail");
        assert!(matches!(err, CompletionError::Api(ref message) if message == "quota exceeded"));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let err = GeminiClient::new("k", DEFAULT_MODEL)
            .with_base_url("http://127.0.0.1:1")
            .complete(&conversation())
            .await
            .expect_err("closed port should fail");
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_api_key() {
        let err = GeminiClient::new("SECRET-KEY-123", DEFAULT_MODEL)
            .with_base_url("http://127.0.0.1:1")
            .complete(&conversation())
            .await
            .expect_err("closed port should fail");

        assert!(err.is_network());
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn api_key_is_not_sent_in_the_query_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .mount(&server)
            .await;

        client_for(&server)
            .complete(&conversation())
            .await
            .expect("completion should succeed");

        let requests = server
            .received_requests()
            .await
            .expect("request recording is on by default");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.query().is_none());
    }
}
