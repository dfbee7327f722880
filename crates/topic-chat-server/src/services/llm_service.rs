use crate::config::LlmConfig;
use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::chat::ChatMessage;
use crate::services::conversation::LlmProvider;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Failed to call LLM API: {0}")]
    Transport(String),

    #[error("LLM API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse LLM response: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: usize,
    pub stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Client for an OpenAI-compatible chat completion endpoint
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    config: LlmConfig,
}

impl LlmService {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Generate completion without streaming (wait for full response)
    pub async fn generate_chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        debug!(
            "Starting chat generation with {} messages (model {})",
            messages.len(),
            self.config.model
        );

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::Malformed("No choices returned from LLM".to_string()))
    }
}

#[async_trait::async_trait]
impl LlmProvider for LlmService {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        Ok(self.generate_chat(messages).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            base_url,
            api_key: api_key.map(str::to_string),
            model: "llama3-70b-8192".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_seconds: 5,
        }
    }

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are helpful. Respond in English."),
            ChatMessage::user("the history of Rome"),
        ]
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({
                "model": "llama3-70b-8192",
                "max_tokens": 1024,
                "stream": false,
                "messages": [
                    {"role": "system", "content": "You are helpful. Respond in English."},
                    {"role": "user", "content": "the history of Rome"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Rome was founded in 753 BC."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = LlmService::new(config(server.uri(), Some("secret"))).unwrap();
        let reply = service.generate(&messages()).await.unwrap();
        assert_eq!(reply, "Rome was founded in 753 BC.");
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let service = LlmService::new(config(server.uri(), None)).unwrap();
        let err = service.generate_chat(&messages()).await.unwrap_err();
        assert_eq!(err.to_string(), "LLM API error: 429 - rate limited");
    }

    #[tokio::test]
    async fn test_empty_choices_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let service = LlmService::new(config(server.uri(), None)).unwrap();
        let err = service.generate_chat(&messages()).await.unwrap_err();
        assert!(matches!(err, LlmError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_failure() {
        let service = LlmService::new(config("http://127.0.0.1:1".to_string(), None)).unwrap();
        let err = service.generate_chat(&messages()).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }
}
