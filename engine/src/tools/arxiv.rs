//! arXiv paper lookup
//!
//! Queries the arXiv export API and renders the top hits as short
//! `Published / Title / Authors / Summary` blocks.

use async_trait::async_trait;
use sdk::{SageError, Tool};
use serde::Deserialize;
use tracing::debug;

use super::{http_client, truncate_chars, MAX_QUERY_CHARS};
use crate::config::ArxivConfig;

const NO_RESULT: &str = "No good Arxiv Result was found";

pub struct ArxivTool {
    base_url: String,
    top_k_results: usize,
    doc_content_chars_max: usize,
    client: reqwest::Client,
}

/// One paper from the Atom feed
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub published: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: String,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

impl ArxivTool {
    pub fn new(config: &ArxivConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            top_k_results: config.top_k_results,
            doc_content_chars_max: config.doc_content_chars_max,
            client: http_client(),
        }
    }

    /// Fetch the top papers for `query`
    pub async fn search(&self, query: &str) -> Result<Vec<Paper>, SageError> {
        let query = truncate_chars(query.trim(), MAX_QUERY_CHARS);
        let max_results = self.top_k_results.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_query", query.as_str()),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SageError::Network(format!("arXiv request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SageError::Tool(format!(
                "arXiv returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SageError::Network(format!("arXiv response unreadable: {}", e)))?;

        parse_feed(&body)
    }

    fn render(&self, papers: &[Paper]) -> String {
        if papers.is_empty() {
            return NO_RESULT.to_string();
        }

        let docs: Vec<String> = papers
            .iter()
            .map(|p| {
                format!(
                    "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
                    p.published,
                    p.title,
                    p.authors.join(", "),
                    p.summary
                )
            })
            .collect();

        truncate_chars(&docs.join("\n\n"), self.doc_content_chars_max)
    }
}

/// Parse an arXiv Atom feed into papers.
///
/// Whitespace inside titles and summaries is collapsed (arXiv wraps them
/// across lines) and the publication timestamp is cut to its date. Entries
/// without a title, such as arXiv's error entries, are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>, SageError> {
    let feed: Feed = quick_xml::de::from_str(xml)
        .map_err(|e| SageError::Tool(format!("Failed to parse arXiv feed: {}", e)))?;

    Ok(feed
        .entries
        .into_iter()
        .filter(|e| !e.title.trim().is_empty() && e.title.trim() != "Error")
        .map(|e| Paper {
            published: e
                .published
                .split('T')
                .next()
                .unwrap_or_default()
                .to_string(),
            title: collapse_whitespace(&e.title),
            authors: e
                .authors
                .into_iter()
                .map(|a| collapse_whitespace(&a.name))
                .collect(),
            summary: collapse_whitespace(&e.summary),
        })
        .collect())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn description(&self) -> &str {
        "Searches arxiv.org. Useful for questions about physics, mathematics, computer science, quantitative biology, quantitative finance, statistics, electrical engineering, and economics from scientific articles. Input should be a search query."
    }

    async fn query(&self, input: &str) -> Result<String, SageError> {
        let papers = self.search(input).await?;
        debug!("arXiv returned {} papers", papers.len());
        Ok(self.render(&papers))
    }
}
