//! Web search
//!
//! Uses Google Programmable Search when credentials are configured and a
//! placeholder answer otherwise, so the agent keeps working without keys.

use async_trait::async_trait;
use sdk::{SageError, Tool};
use serde::Deserialize;
use tracing::debug;

use super::http_client;
use crate::config::{GoogleCredentials, WebSearchConfig};

const NO_RESULT: &str = "No good Google Search Result was found";

/// Where search queries go
#[derive(Debug, Clone)]
pub enum SearchBackend {
    Google(GoogleCredentials),
    Placeholder,
}

impl From<Option<GoogleCredentials>> for SearchBackend {
    fn from(credentials: Option<GoogleCredentials>) -> Self {
        match credentials {
            Some(creds) => SearchBackend::Google(creds),
            None => SearchBackend::Placeholder,
        }
    }
}

impl SearchBackend {
    /// Google when `GOOGLE_API_KEY` and `GOOGLE_CSE_ID` are both set
    pub fn from_env() -> Self {
        GoogleCredentials::from_env().into()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchBackend::Google(_) => "google",
            SearchBackend::Placeholder => "placeholder",
        }
    }
}

pub struct WebSearchTool {
    base_url: String,
    num_results: usize,
    backend: SearchBackend,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    snippet: String,
}

impl WebSearchTool {
    pub fn new(config: &WebSearchConfig, backend: SearchBackend) -> Self {
        Self {
            base_url: config.base_url.clone(),
            num_results: config.num_results,
            backend,
            client: http_client(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    async fn google(&self, creds: &GoogleCredentials, query: &str) -> Result<String, SageError> {
        let num = self.num_results.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", creds.api_key.unsecure()),
                ("cx", creds.cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SageError::Network(format!("Search request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            return Err(SageError::Tool(format!(
                "Search returned HTTP {}",
                response.status()
            )));
        }

        let data: GoogleResponse = response
            .json()
            .await
            .map_err(|e| SageError::Tool(format!("Failed to parse search response: {}", e)))?;

        debug!("Google returned {} items", data.items.len());
        Ok(render_snippets(&data.items))
    }
}

fn render_snippets(items: &[GoogleItem]) -> String {
    let snippets: Vec<&str> = items
        .iter()
        .map(|item| item.snippet.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if snippets.is_empty() {
        NO_RESULT.to_string()
    } else {
        snippets.join(" ")
    }
}

fn placeholder(query: &str) -> String {
    format!(
        "Here are search results for: {} (Note: This is a placeholder. Add Google API keys to enable real search)",
        query
    )
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Useful for questions about recent events or anything not covered by Wikipedia or arXiv. Input should be a search query."
    }

    async fn query(&self, input: &str) -> Result<String, SageError> {
        let query = input.trim();
        match &self.backend {
            SearchBackend::Google(creds) => self.google(creds, query).await,
            SearchBackend::Placeholder => Ok(placeholder(query)),
        }
    }
}
