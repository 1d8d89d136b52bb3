//! Retrieval tools
//!
//! The fixed set of tools the agent may call: web search, Wikipedia and
//! arXiv. Tool failures are handed back to the model as observations.

pub mod arxiv;
pub mod web_search;
pub mod wikipedia;

pub use arxiv::ArxivTool;
pub use web_search::{SearchBackend, WebSearchTool};
pub use wikipedia::WikipediaTool;

use sdk::Tool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ToolsConfig;

/// Timeout for a single retrieval request
const TOOL_HTTP_TIMEOUT_SECS: u64 = 30;

/// Longest query forwarded to arXiv or Wikipedia, in characters
pub(crate) const MAX_QUERY_CHARS: usize = 300;

/// Registry of the tools the agent can call.
///
/// The set is fixed when the registry is built. Only tools in the set are
/// advertised in the system prompt and available for dispatch.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a registry over an explicit tool set.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Create an empty registry with no tools enabled.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Assemble web search, arXiv and Wikipedia from configuration.
    pub fn from_config(config: &ToolsConfig, search: SearchBackend) -> Self {
        match &search {
            SearchBackend::Google(_) => info!("Web search backend: google"),
            SearchBackend::Placeholder => {
                warn!("Web search backend: placeholder (set GOOGLE_API_KEY and GOOGLE_CSE_ID for real results)")
            }
        }

        let search = WebSearchTool::new(&config.web_search, search);
        Self::new(vec![
            Arc::new(search),
            Arc::new(ArxivTool::new(&config.arxiv)),
            Arc::new(WikipediaTool::new(&config.wikipedia)),
        ])
    }

    /// Names of all registered tools, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up a tool by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Dispatch a tool call by name.
    ///
    /// Returns the tool output as a string. Errors are returned as
    /// `ERROR: ...` observations so the model can see them and self-correct.
    pub async fn dispatch(&self, name: &str, input: &str) -> String {
        debug!("Dispatching tool '{}' with input: {}", name, input);

        let Some(tool) = self.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return format!(
                "ERROR: Unknown tool '{}'. Available tools: {}",
                name,
                self.names().join(", ")
            );
        };

        match tool.query(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool '{}' failed: {}", tool.name(), e);
                format!("ERROR: {}", e)
            }
        }
    }

    /// Generate a system prompt describing the available tools.
    pub fn system_prompt(&self) -> String {
        let mut parts = vec![
            "You are a research assistant that answers questions using tools to search the web, Wikipedia, and arXiv.".to_string(),
            String::new(),
            "IMPORTANT RULES:".to_string(),
            "1. To use a tool, your ENTIRE response must be ONLY a JSON object of this form, with nothing before or after it:".to_string(),
            r#"{"action": "tool_name", "action_input": "search query"}"#.to_string(),
            "2. After a tool call you will receive a message starting with \"Observation:\" containing the tool output.".to_string(),
            "3. When you know the answer, respond with the answer in plain text, or with:".to_string(),
            r#"{"action": "Final Answer", "action_input": "your answer"}"#.to_string(),
            "4. Never invent tool output. Call the tool and wait for the observation.".to_string(),
        ];

        if self.tools.is_empty() {
            parts.push(String::new());
            parts.push("No tools are available. Answer from your own knowledge.".to_string());
            return parts.join("\n");
        }

        parts.push(String::new());
        parts.push("Available tools:".to_string());
        for tool in &self.tools {
            parts.push(String::new());
            parts.push(format!("## {}", tool.name()));
            parts.push(tool.description().to_string());
        }

        parts.join("\n")
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

/// HTTP client shared by the retrieval tools
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(TOOL_HTTP_TIMEOUT_SECS))
        .user_agent(concat!("sage/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// Keep at most `max_chars` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
