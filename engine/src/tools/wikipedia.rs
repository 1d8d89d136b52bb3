//! Wikipedia lookup
//!
//! Two calls per query against the MediaWiki action API: a full-text search
//! for the best matching titles, then an intro extract for each title.

use async_trait::async_trait;
use sdk::{SageError, Tool};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{http_client, truncate_chars, MAX_QUERY_CHARS};
use crate::config::WikipediaConfig;

const NO_RESULT: &str = "No good Wikipedia Search Result was found";

pub struct WikipediaTool {
    base_url: String,
    top_k_results: usize,
    doc_content_chars_max: usize,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
}

impl WikipediaTool {
    pub fn new(config: &WikipediaConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            top_k_results: config.top_k_results,
            doc_content_chars_max: config.doc_content_chars_max,
            client: http_client(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, SageError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| SageError::Network(format!("Wikipedia request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SageError::Tool(format!(
                "Wikipedia returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SageError::Tool(format!("Failed to parse Wikipedia response: {}", e)))
    }

    /// Titles of the best matching pages, best first
    pub async fn search_titles(&self, query: &str) -> Result<Vec<String>, SageError> {
        let query = truncate_chars(query.trim(), MAX_QUERY_CHARS);
        let limit = self.top_k_results.to_string();

        let data: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query.as_str()),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        Ok(data
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    /// Plain-text intro of a page, or `None` when the page has none
    pub async fn page_summary(&self, title: &str) -> Result<Option<(String, String)>, SageError> {
        let data: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        Ok(data
            .query
            .and_then(|q| q.pages.into_iter().find(|p| !p.missing))
            .and_then(|p| {
                let extract = p.extract?.trim().to_string();
                (!extract.is_empty()).then_some((p.title, extract))
            }))
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions about people, places, companies, facts, historical events, or other subjects. Input should be a search query."
    }

    async fn query(&self, input: &str) -> Result<String, SageError> {
        let titles = self.search_titles(input).await?;
        debug!("Wikipedia search matched {} titles", titles.len());

        let mut docs = Vec::new();
        for title in titles.iter().take(self.top_k_results) {
            match self.page_summary(title).await {
                Ok(Some((page, summary))) => {
                    docs.push(format!("Page: {}\nSummary: {}", page, summary));
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping Wikipedia page '{}': {}", title, e),
            }
        }

        if docs.is_empty() {
            return Ok(NO_RESULT.to_string());
        }

        Ok(truncate_chars(&docs.join("\n\n"), self.doc_content_chars_max))
    }
}
