//! Progress events emitted while the agent is running
//!
//! A `ProgressSink` is purely observational: it is handed every event the
//! agent produces between receiving a prompt and returning an answer, and has
//! no way to influence what the agent does next.

use serde::{Deserialize, Serialize};

/// Incremental status from a running agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The model is being asked for its next step
    Thinking { iteration: usize },

    /// A tool call is about to run
    ToolStarted { tool: String, input: String },

    /// A tool call returned an observation
    ToolFinished { tool: String, output: String },

    /// The model produced its final answer
    FinalAnswer { content: String },
}

/// Observer of agent progress
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: AgentEvent);
}

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&self, _event: AgentEvent) {}
}
