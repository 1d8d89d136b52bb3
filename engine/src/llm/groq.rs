//! Groq LLM Provider
//!
//! Talks to Groq's OpenAI-compatible chat completions endpoint. The credential,
//! model and temperature come from the session's settings on every request.
//! Tool observations are sent back as user messages prefixed with
//! `Observation:` since the endpoint only accepts tool messages tied to native
//! function calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    parse_agent_step, CompletionRequest, LLMError, LLMProvider, LLMResponse, Message,
    MessageRole, Result,
};

pub struct GroqProvider {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize, PartialEq)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionPayload<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl GroqProvider {
    /// Create a provider for the given API base URL
    /// (e.g. "https://api.groq.com/openai/v1")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a provider whose HTTP client gives up after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;
        Ok(Self::with_client(base_url, client))
    }

    fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn convert_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|msg| match msg.role {
                MessageRole::System => ApiMessage {
                    role: "system",
                    content: msg.content.clone(),
                },
                MessageRole::User => ApiMessage {
                    role: "user",
                    content: msg.content.clone(),
                },
                MessageRole::Assistant => ApiMessage {
                    role: "assistant",
                    content: msg.content.clone(),
                },
                MessageRole::Tool => ApiMessage {
                    role: "user",
                    content: format!("Observation: {}", msg.content),
                },
            })
            .collect()
    }
}

#[async_trait]
impl LLMProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> Result<LLMResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let payload = ChatCompletionPayload {
            model: &request.params.model,
            messages: Self::convert_messages(request.messages),
            temperature: request.params.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(request.credential.unsecure())
            .json(&payload)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 | 403 => LLMError::AuthenticationFailed(text),
                429 => LLMError::RateLimitExceeded,
                _ => LLMError::InvalidRequest(format!("{}: {}", status, text)),
            });
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let content = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LLMError::ParseError("Empty content".to_string()))?;

        Ok(parse_agent_step(&content))
    }
}
