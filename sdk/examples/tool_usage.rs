//! Example implementing the Tool trait and observing progress events

use async_trait::async_trait;
use sdk::{AgentEvent, Exchange, ProgressSink, SageError, SageErrorExt, Tool, Turn};

/// Looks words up in a tiny built-in glossary
struct Glossary;

#[async_trait]
impl Tool for Glossary {
    fn name(&self) -> &str {
        "glossary"
    }

    fn description(&self) -> &str {
        "Defines a physics term. Input should be a single term."
    }

    async fn query(&self, input: &str) -> Result<String, SageError> {
        match input.trim().to_lowercase().as_str() {
            "qubit" => Ok("A qubit is the basic unit of quantum information.".to_string()),
            "" => Err(SageError::Validation("empty term".to_string())),
            other => Err(SageError::Tool(format!("no entry for '{}'", other))),
        }
    }
}

struct StdoutSink;

impl ProgressSink for StdoutSink {
    fn on_event(&self, event: AgentEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => println!("event: {}", json),
            Err(e) => println!("unserializable event: {}", e),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let tool = Glossary;
    let sink = StdoutSink;

    for term in ["qubit", "boson", " "] {
        sink.on_event(AgentEvent::ToolStarted {
            tool: tool.name().to_string(),
            input: term.to_string(),
        });

        let output = match tool.query(term).await {
            Ok(text) => text,
            Err(e) => format!("{} (hint: {})", e, e.user_hint()),
        };

        sink.on_event(AgentEvent::ToolFinished {
            tool: tool.name().to_string(),
            output,
        });
    }

    // Conversation types serialize the way the UI consumes them
    let turn = Turn::user("What is a qubit?");
    let exchange = Exchange::new("What is a qubit?", "The basic unit of quantum information.");
    println!("turn: {:?}", serde_json::to_string(&turn));
    println!("exchange: {:?}", serde_json::to_string(&exchange));
}
