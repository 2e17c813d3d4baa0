use super::{status_error, trim_base_url, CompletionClient, CompletionError};
use crate::session::{Message, Sender};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// OpenAI-compatible `chat/completions` backend, authenticated with a bearer key.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    system_prompt: Option<String>,
    max_tokens: u32,
    temperature: f64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_prompt: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt.filter(|prompt| !prompt.trim().is_empty());
        self
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f64) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    fn role(sender: Sender) -> &'static str {
        match sender {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }

    fn build_request<'a>(&'a self, transcript: &'a [Message]) -> ChatRequest<'a> {
        let system = self.system_prompt.as_deref().map(|content| ChatMessage {
            role: "system",
            content,
        });
        let messages = system
            .into_iter()
            .chain(transcript.iter().map(|message| ChatMessage {
                role: Self::role(message.sender),
                content: &message.content,
            }))
            .collect();

        ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    fn extract_text(response: ChatResponse) -> Result<String, CompletionError> {
        if let Some(err) = response.error {
            return Err(CompletionError::Api(err.message));
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::Malformed("response has no choices[0].message.content".into()))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, transcript: &[Message]) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", trim_base_url(&self.base_url));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(transcript))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let bytes = response.bytes().await?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|err| CompletionError::Malformed(err.to_string()))?;
        Self::extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn conversation() -> Vec<Message> {
        vec![Message::user("Hello"), Message::assistant("Hi"), Message::user("Bye")]
    }

    #[test]
    fn request_without_system_prompt_replays_history_only() {
        let client = OpenAiClient::new("k", DEFAULT_MODEL);
        let transcript = conversation();
        let value = serde_json::to_value(client.build_request(&transcript))
            .expect("request should serialize");

        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["max_tokens"], 1000);
        assert_eq!(
            value["messages"],
            json!([
                {"role": "user", "content": "Hello"},
                {"role": "assistant", "content": "Hi"},
                {"role": "user", "content": "Bye"}
            ])
        );
    }

    #[test]
    fn system_prompt_is_prepended_when_configured() {
        let client = OpenAiClient::new("k", DEFAULT_MODEL)
            .with_system_prompt(Some("You are ARIA.".to_string()));
        let transcript = conversation();
        let request = client.build_request(&transcript);

        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, "You are ARIA.");
    }

    #[test]
    fn blank_system_prompt_is_ignored() {
        let client = OpenAiClient::new("k", DEFAULT_MODEL).with_system_prompt(Some("  ".into()));
        assert!(client.system_prompt.is_none());
    }

    #[tokio::test]
    async fn complete_uses_bearer_auth_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": "Hello"},
                    {"role": "assistant", "content": "Hi"},
                    {"role": "user", "content": "Bye"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "See you!"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = OpenAiClient::new("sk-test", DEFAULT_MODEL)
            .with_base_url(server.uri())
            .complete(&conversation())
            .await
            .expect("completion should succeed");
        assert_eq!(reply, "See you!");
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = OpenAiClient::new("k", DEFAULT_MODEL)
            .with_base_url(server.uri())
            .complete(&conversation())
            .await
            .expect_err("no choices should fail");
        assert!(matches!(err, CompletionError::Malformed(_)));
    }

    #[tokio::test]
    async fn unauthorized_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided"}
            })))
            .mount(&server)
            .await;

        let err = OpenAiClient::new("bad", DEFAULT_MODEL)
            .with_base_url(server.uri())
            .complete(&conversation())
            .await
            .expect_err("401 should fail");
        assert!(matches!(err, CompletionError::Status { status: 401, .. }));
    }
}
