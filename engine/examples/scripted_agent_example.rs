//! Example running the ReAct agent offline
//!
//! A scripted provider stands in for the model: it asks the search tool
//! once and then answers. The search tool runs in placeholder mode, so no
//! network access or API key is needed.

use async_trait::async_trait;
use std::sync::Arc;

use sage_engine::agent::{AgentRequest, AgentRunner, ReactAgent};
use sage_engine::config::WebSearchConfig;
use sage_engine::llm::{
    CompletionRequest, FinalAnswer, LLMProvider, LLMResponse, MessageRole, ModelParams, Result,
    ToolCall,
};
use sage_engine::secrets::SecretString;
use sage_engine::tools::{SearchBackend, ToolRegistry, WebSearchTool};
use sdk::{AgentEvent, ProgressSink};

/// Calls the search tool first, then answers with the observation it got
struct ScriptedProvider;

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> Result<LLMResponse> {
        let observation = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Tool);

        Ok(match observation {
            None => LLMResponse::ToolCall(ToolCall::new("search", "James Webb telescope discoveries")),
            Some(obs) => LLMResponse::FinalAnswer(FinalAnswer::new(format!(
                "Based on the search: {}",
                obs.content
            ))),
        })
    }
}

/// Prints each step as it happens
struct PrintSink;

impl ProgressSink for PrintSink {
    fn on_event(&self, event: AgentEvent) {
        match event {
            AgentEvent::Thinking { iteration } => println!("[{}] thinking", iteration),
            AgentEvent::ToolStarted { tool, input } => println!("  -> {}({})", tool, input),
            AgentEvent::ToolFinished { tool, output } => println!("  <- {}: {}", tool, output),
            AgentEvent::FinalAnswer { .. } => println!("  done"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let tools = ToolRegistry::new(vec![Arc::new(WebSearchTool::new(
        &WebSearchConfig::default(),
        SearchBackend::Placeholder,
    ))]);

    println!("=== Tools ===\n{}\n", tools.system_prompt());

    let agent = ReactAgent::new(Arc::new(ScriptedProvider)).with_max_iterations(3);
    let params = ModelParams {
        model: "llama3-8b-8192".to_string(),
        temperature: 0.7,
    };
    let credential = SecretString::new("not-needed");

    let answer = agent
        .run(
            AgentRequest {
                prompt: "What has the James Webb telescope found?",
                memory: &[],
                tools: &tools,
                params: &params,
                credential: &credential,
            },
            &PrintSink,
        )
        .await?;

    println!("\nAnswer: {}", answer);
    Ok(())
}
