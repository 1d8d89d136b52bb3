//! Chat Controller
//!
//! Drives one exchange at a time through the session store:
//!
//! ```text
//! Idle -> AwaitingInput -> PromptSubmitted -> AgentRunning -> Completed | Failed -> Idle
//! ```
//!
//! Input is validated and the credential checked before anything is
//! recorded, so a rejected submission leaves the transcript as it was. Once
//! the user turn is in, the exchange always ends with an assistant turn:
//! the answer, or the agent's error as visible text.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use sdk::{ProgressSink, SageError};

use crate::agent::{AgentRequest, AgentRunner};
use crate::secrets;
use crate::session::{validate_user_text, SessionStore};
use crate::tools::ToolRegistry;

pub mod settings;

pub use settings::{ModelChoice, Settings};

/// Shown instead of running the agent when no credential is set
pub const MISSING_CREDENTIAL: &str = "Please enter your Groq API key in the sidebar.";

/// Where the current exchange stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeState {
    #[default]
    Idle,
    AwaitingInput,
    PromptSubmitted,
    AgentRunning,
    Completed,
    Failed,
}

/// How a submitted exchange ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExchangeOutcome {
    Completed { answer: String },

    /// The agent failed; `reply` is what was recorded as the assistant turn
    Failed { error: String, reply: String },
}

impl ExchangeOutcome {
    /// The assistant turn recorded for this exchange
    pub fn reply(&self) -> &str {
        match self {
            ExchangeOutcome::Completed { answer } => answer,
            ExchangeOutcome::Failed { reply, .. } => reply,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ExchangeOutcome::Completed { .. })
    }
}

/// Visible assistant text for an agent failure
pub fn error_reply(message: &str) -> String {
    format!("I encountered an error: Error: {}", message)
}

pub struct ChatController {
    runner: Arc<dyn AgentRunner>,
    tools: Arc<ToolRegistry>,
}

impl ChatController {
    pub fn new(runner: Arc<dyn AgentRunner>, tools: Arc<ToolRegistry>) -> Self {
        Self { runner, tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one exchange against `store`.
    ///
    /// # Errors
    ///
    /// * `SageError::Validation` for empty or whitespace-only input
    /// * `SageError::Configuration` when no credential is set
    ///
    /// Both leave the transcript unchanged. Agent failures are not errors
    /// here; they come back as `ExchangeOutcome::Failed`.
    pub async fn submit(
        &self,
        store: &mut SessionStore,
        input: &str,
        settings: &Settings,
        sink: &dyn ProgressSink,
    ) -> Result<ExchangeOutcome, SageError> {
        store.initialize();
        transition(store, ExchangeState::AwaitingInput);

        validate_user_text(input)?;
        let credential = settings
            .credential()
            .ok_or_else(|| SageError::Configuration(MISSING_CREDENTIAL.to_string()))?;

        store.append_user_turn(input)?;
        transition(store, ExchangeState::PromptSubmitted);

        let params = settings.model_params();
        info!(
            "Running agent (model={}, temperature={}, memory={})",
            params.model,
            params.temperature,
            store.memory().len()
        );
        transition(store, ExchangeState::AgentRunning);

        let result = {
            let request = AgentRequest {
                prompt: input,
                memory: store.snapshot_for_agent(),
                tools: &self.tools,
                params: &params,
                credential,
            };
            self.runner.run(request, sink).await
        };

        let outcome = match result {
            Ok(answer) => {
                store.record_exchange(input, &answer);
                transition(store, ExchangeState::Completed);
                ExchangeOutcome::Completed { answer }
            }
            Err(e) => {
                let error = secrets::scrub(&e.to_string(), Some(credential));
                warn!("Agent failed: {}", error);
                let reply = error_reply(&error);
                store.record_exchange(input, &reply);
                transition(store, ExchangeState::Failed);
                ExchangeOutcome::Failed { error, reply }
            }
        };

        transition(store, ExchangeState::Idle);
        Ok(outcome)
    }

    /// Clear the conversation back to the greeting
    pub fn reset(&self, store: &mut SessionStore) {
        store.reset();
        debug!("Session reset");
    }
}

fn transition(store: &mut SessionStore, next: ExchangeState) {
    debug!("Exchange state {:?} -> {:?}", store.state(), next);
    store.set_state(next);
}
