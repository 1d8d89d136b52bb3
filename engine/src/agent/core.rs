//! ReAct agent loop
//!
//! Each run goes through an iterative think-act-observe cycle:
//!
//! 1. Seed working memory with the tool prompt, prior exchanges and the question
//! 2. Ask the model for its next step (each call under a timeout)
//! 3. Tool call: dispatch it, append the observation, go again
//! 4. Final answer: return it
//!
//! Running out of iterations is not an error; the run finishes with a fixed
//! stop message that the controller records like any other answer.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use sdk::{AgentEvent, ProgressSink};

use super::{AgentError, AgentRequest, AgentRunner, WorkingMemory};
use crate::config::LLMConfig;
use crate::llm::{CompletionRequest, LLMProvider, LLMResponse, Message};

/// Default number of model calls per run
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Default timeout for each model call in seconds
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Answer returned when the loop runs out of iterations
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

pub struct ReactAgent {
    provider: Arc<dyn LLMProvider>,
    max_iterations: usize,
    llm_timeout: Duration,
}

impl ReactAgent {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }

    /// Agent with the limits from the `[llm]` section
    pub fn from_config(provider: Arc<dyn LLMProvider>, config: &LLMConfig) -> Self {
        Self::new(provider)
            .with_max_iterations(config.max_iterations)
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_timeout(mut self, llm_timeout: Duration) -> Self {
        self.llm_timeout = llm_timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[async_trait]
impl AgentRunner for ReactAgent {
    async fn run(
        &self,
        request: AgentRequest<'_>,
        sink: &dyn ProgressSink,
    ) -> Result<String, AgentError> {
        let mut memory = WorkingMemory::seed(
            &request.tools.system_prompt(),
            request.memory,
            request.prompt,
        );

        for iteration in 1..=self.max_iterations {
            debug!("Agent iteration {}/{}", iteration, self.max_iterations);
            sink.on_event(AgentEvent::Thinking { iteration });

            let completion = CompletionRequest {
                messages: memory.messages(),
                params: request.params,
                credential: request.credential,
            };

            let response = match timeout(self.llm_timeout, self.provider.generate(completion)).await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!("LLM call failed: {}", e);
                    return Err(e.into());
                }
                Err(_) => {
                    warn!("LLM call timed out after {}s", self.llm_timeout.as_secs());
                    return Err(AgentError::Timeout(self.llm_timeout.as_secs()));
                }
            };

            match response {
                LLMResponse::ToolCall(call) => {
                    debug!("Tool call: {} ({})", call.name, call.input);
                    sink.on_event(AgentEvent::ToolStarted {
                        tool: call.name.clone(),
                        input: call.input.clone(),
                    });

                    memory.add_message(Message::assistant(
                        serde_json::json!({
                            "action": &call.name,
                            "action_input": &call.input,
                        })
                        .to_string(),
                    ));

                    let observation = request.tools.dispatch(&call.name, &call.input).await;

                    sink.on_event(AgentEvent::ToolFinished {
                        tool: call.name,
                        output: observation.clone(),
                    });
                    memory.add_message(Message::tool_result(observation));
                }
                LLMResponse::FinalAnswer(answer) => {
                    info!("Agent finished after {} iterations", iteration);
                    sink.on_event(AgentEvent::FinalAnswer {
                        content: answer.content.clone(),
                    });
                    return Ok(answer.content);
                }
            }
        }

        warn!("Agent hit the iteration limit ({})", self.max_iterations);
        sink.on_event(AgentEvent::FinalAnswer {
            content: ITERATION_LIMIT_ANSWER.to_string(),
        });
        Ok(ITERATION_LIMIT_ANSWER.to_string())
    }
}
