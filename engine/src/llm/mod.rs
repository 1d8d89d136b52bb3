//! LLM Provider Abstraction Layer
//!
//! This module provides the interface the agent uses to talk to a chat model.
//! The `LLMProvider` trait defines the contract; `GroqProvider` implements it
//! against Groq's OpenAI-compatible API. Model parameters and the credential
//! travel with every request because they are chosen per session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::secrets::SecretString;

pub mod groq;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Message in a conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender (user, assistant, system, tool)
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Observation returned by a tool
    pub fn tool_result(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// Model name and sampling temperature chosen in the settings surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
}

/// Everything a provider needs for one completion
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub messages: &'a [Message],
    pub params: &'a ModelParams,
    pub credential: &'a SecretString,
}

/// Response from an LLM provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LLMResponse {
    /// LLM wants to call a tool
    ToolCall(ToolCall),

    /// LLM has provided a final answer
    FinalAnswer(FinalAnswer),
}

/// Tool call request from the LLM
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Name of the tool to call
    pub name: String,

    /// Text handed to the tool's query
    pub input: String,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
        }
    }
}

/// Final answer from the LLM
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalAnswer {
    pub content: String,
}

impl FinalAnswer {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "groq")
    fn name(&self) -> &str;

    /// Generate the next agent step from the conversation so far
    ///
    /// # Returns
    /// * `Ok(LLMResponse)` - Either a tool call or final answer
    /// * `Err(LLMError)` - If the request fails
    async fn generate(&self, request: CompletionRequest<'_>) -> Result<LLMResponse>;
}

/// Action name the model uses to finish instead of calling a tool
pub const FINAL_ANSWER_ACTION: &str = "Final Answer";

/// Interpret model output as the next agent step.
///
/// Handles several output shapes:
/// 1. Raw JSON: `{"action": "...", "action_input": "..."}`
/// 2. Fenced JSON (with or without surrounding prose)
/// 3. JSON embedded in prose, found by scanning for `{"action"`
///
/// `{"action": "Final Answer", ...}` and plain prose are both final answers.
pub fn parse_agent_step(content: &str) -> LLMResponse {
    let trimmed = content.trim();

    let candidate = try_parse_action_json(trimmed)
        .or_else(|| {
            extract_fenced_json(trimmed).and_then(|inner| try_parse_action_json(inner.trim()))
        })
        .or_else(|| {
            let pos = trimmed.find("{\"action\"")?;
            extract_balanced_json(&trimmed[pos..]).and_then(try_parse_action_json)
        });

    match candidate {
        Some(call) if call.name.eq_ignore_ascii_case(FINAL_ANSWER_ACTION) => {
            LLMResponse::FinalAnswer(FinalAnswer::new(call.input))
        }
        Some(call) => LLMResponse::ToolCall(call),
        None => LLMResponse::FinalAnswer(FinalAnswer::new(trimmed)),
    }
}

/// Try to parse a string as an `{"action": "...", "action_input": ...}` step.
///
/// Non-string inputs (e.g. `{"query": "..."}`) are flattened to their
/// `query` field, or to compact JSON when there is none.
fn try_parse_action_json(s: &str) -> Option<ToolCall> {
    let json: serde_json::Value = serde_json::from_str(s).ok()?;
    let action = json.get("action")?.as_str()?;
    let input = match json.get("action_input") {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(value) => value
            .get("query")
            .and_then(|q| q.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        None => String::new(),
    };
    Some(ToolCall::new(action.trim(), input))
}

/// Extract the body of the first markdown code fence in the text.
fn extract_fenced_json(content: &str) -> Option<&str> {
    let fence_start = content.find("```")?;
    let after_opening = &content[fence_start + 3..];

    // Skip the language tag line (e.g. "json\n")
    let body_start = fence_start + 3 + after_opening.find('\n')? + 1;
    let body_end = body_start + content[body_start..].find("```")?;

    (body_start < body_end).then(|| &content[body_start..body_end])
}

/// Extract a balanced JSON object starting at position 0 of `s`,
/// respecting string literals.
fn extract_balanced_json(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
