//! Agent Runner
//!
//! The agent takes a prompt plus the session's conversational memory and
//! produces a final text answer, calling retrieval tools along the way.
//! `AgentRunner` is the seam the chat controller talks to; `ReactAgent` is
//! the think-act-observe implementation over an `LLMProvider`.

use async_trait::async_trait;
use sdk::{Exchange, ProgressSink};

use crate::llm::{LLMError, ModelParams};
use crate::secrets::SecretString;
use crate::tools::ToolRegistry;

pub mod core;
pub mod working_memory;

pub use core::{ReactAgent, ITERATION_LIMIT_ANSWER};
pub use working_memory::WorkingMemory;

/// Errors from a single agent run
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] LLMError),

    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

/// Everything one agent run needs
#[derive(Debug, Clone, Copy)]
pub struct AgentRequest<'a> {
    /// The user's question
    pub prompt: &'a str,

    /// Prior exchanges of the session, oldest first
    pub memory: &'a [Exchange],

    /// Tools the agent may call
    pub tools: &'a ToolRegistry,

    pub params: &'a ModelParams,

    pub credential: &'a SecretString,
}

/// Runs one prompt to a final answer
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(
        &self,
        request: AgentRequest<'_>,
        sink: &dyn ProgressSink,
    ) -> Result<String, AgentError>;
}
