//! Integration tests for the retrieval tools
//!
//! Each backend (arXiv, Wikipedia, Google search) is served by a wiremock
//! server so the tools run their real request and parsing paths.

use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use sage_engine::config::{ArxivConfig, GoogleCredentials, WebSearchConfig, WikipediaConfig};
use sage_engine::tools::{ArxivTool, SearchBackend, ToolRegistry, WebSearchTool, WikipediaTool};
use sdk::{SageError, Tool};

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=quantum entanglement</title>
  <id>http://arxiv.org/api/test</id>
  <updated>2024-03-01T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <published>2024-01-02T18:00:00Z</published>
    <title>Entanglement in
      Many-Body Systems</title>
    <summary>We review entanglement
      in many-body physics.</summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.00002v1</id>
    <published>2024-01-05T09:30:00Z</published>
    <title>Bell Tests Revisited</title>
    <summary>Loophole-free Bell tests.</summary>
    <author><name>John Bell</name></author>
  </entry>
</feed>"#;

const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=zzzz</title>
  <id>http://arxiv.org/api/empty</id>
</feed>"#;

fn arxiv_config(server: &MockServer) -> ArxivConfig {
    ArxivConfig {
        base_url: format!("{}/api/query", server.uri()),
        top_k_results: 2,
        doc_content_chars_max: 4000,
    }
}

fn wikipedia_config(server: &MockServer) -> WikipediaConfig {
    WikipediaConfig {
        base_url: format!("{}/w/api.php", server.uri()),
        top_k_results: 2,
        doc_content_chars_max: 4000,
    }
}

fn search_config(server: &MockServer) -> WebSearchConfig {
    WebSearchConfig {
        base_url: format!("{}/customsearch/v1", server.uri()),
        num_results: 3,
    }
}

fn google() -> SearchBackend {
    SearchBackend::Google(
        GoogleCredentials::from_values(Some("AIza-test".to_string()), Some("cse-1".to_string()))
            .unwrap(),
    )
}

#[tokio::test]
async fn test_arxiv_renders_papers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("search_query", "quantum entanglement"))
        .and(query_param("max_results", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARXIV_FEED))
        .expect(1)
        .mount(&server)
        .await;

    let tool = ArxivTool::new(&arxiv_config(&server));
    let output = tool.query("  quantum entanglement ").await.unwrap();

    assert_eq!(
        output,
        "Published: 2024-01-02\nTitle: Entanglement in Many-Body Systems\nAuthors: Ada Lovelace, Alan Turing\nSummary: We review entanglement in many-body physics.\n\n\
         Published: 2024-01-05\nTitle: Bell Tests Revisited\nAuthors: John Bell\nSummary: Loophole-free Bell tests."
    );
}

#[tokio::test]
async fn test_arxiv_without_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_FEED))
        .mount(&server)
        .await;

    let tool = ArxivTool::new(&arxiv_config(&server));
    let output = tool.query("zzzz").await.unwrap();

    assert_eq!(output, "No good Arxiv Result was found");
}

#[tokio::test]
async fn test_arxiv_output_is_truncated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARXIV_FEED))
        .mount(&server)
        .await;

    let config = ArxivConfig {
        doc_content_chars_max: 40,
        ..arxiv_config(&server)
    };
    let tool = ArxivTool::new(&config);
    let output = tool.query("entanglement").await.unwrap();

    assert_eq!(output.chars().count(), 40);
    assert!(output.starts_with("Published: 2024-01-02"));
}

#[tokio::test]
async fn test_arxiv_server_error_is_tool_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tool = ArxivTool::new(&arxiv_config(&server));
    let err = tool.query("entanglement").await.unwrap_err();

    assert!(matches!(err, SageError::Tool(_)));
}

#[tokio::test]
async fn test_wikipedia_searches_then_summarizes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .and(query_param("srsearch", "quantum entanglement"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": true,
            "query": {
                "search": [
                    { "ns": 0, "title": "Quantum entanglement", "pageid": 25336 },
                    { "ns": 0, "title": "Bell test", "pageid": 4124 }
                ]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts"))
        .and(query_param("titles", "Quantum entanglement"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "pages": [{
                    "pageid": 25336,
                    "title": "Quantum entanglement",
                    "extract": "Quantum entanglement is the phenomenon of correlated states."
                }]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts"))
        .and(query_param("titles", "Bell test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "pages": [{
                    "pageid": 4124,
                    "title": "Bell test",
                    "extract": "A Bell test is a real-world physics experiment."
                }]
            }
        })))
        .mount(&server)
        .await;

    let tool = WikipediaTool::new(&wikipedia_config(&server));
    let output = tool.query("quantum entanglement").await.unwrap();

    assert_eq!(
        output,
        "Page: Quantum entanglement\nSummary: Quantum entanglement is the phenomenon of correlated states.\n\n\
         Page: Bell test\nSummary: A Bell test is a real-world physics experiment."
    );
}

#[tokio::test]
async fn test_wikipedia_skips_missing_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "search": [{ "title": "Ghost page" }] }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": [{ "title": "Ghost page", "missing": true }] }
        })))
        .mount(&server)
        .await;

    let tool = WikipediaTool::new(&wikipedia_config(&server));
    let output = tool.query("ghost").await.unwrap();

    assert_eq!(output, "No good Wikipedia Search Result was found");
}

#[tokio::test]
async fn test_wikipedia_no_search_hits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "search": [] }
        })))
        .mount(&server)
        .await;

    let tool = WikipediaTool::new(&wikipedia_config(&server));
    let output = tool.query("qwertyuiop").await.unwrap();

    assert_eq!(output, "No good Wikipedia Search Result was found");
}

#[tokio::test]
async fn test_google_snippets_are_joined() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("key", "AIza-test"))
        .and(query_param("cx", "cse-1"))
        .and(query_param("q", "latest fusion record"))
        .and(query_param("num", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "title": "a", "snippet": "JET set a fusion energy record." },
                { "title": "b", "snippet": "  " },
                { "title": "c", "snippet": "The record was 69 megajoules." }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(&search_config(&server), google());
    let output = tool.query("latest fusion record").await.unwrap();

    assert_eq!(
        output,
        "JET set a fusion energy record. The record was 69 megajoules."
    );
}

#[tokio::test]
async fn test_google_without_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchInformation": { "totalResults": "0" }
        })))
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(&search_config(&server), google());
    let output = tool.query("nothing at all").await.unwrap();

    assert_eq!(output, "No good Google Search Result was found");
}

#[tokio::test]
async fn test_google_error_does_not_leak_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(&search_config(&server), google());
    let err = tool.query("anything").await.unwrap_err();

    assert!(matches!(err, SageError::Tool(_)));
    assert!(!err.to_string().contains("AIza-test"));
}

#[tokio::test]
async fn test_registry_turns_tool_errors_into_observations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let registry = ToolRegistry::new(vec![std::sync::Arc::new(ArxivTool::new(
        &arxiv_config(&server),
    ))]);
    let observation = registry.dispatch("arxiv", "entanglement").await;

    assert!(observation.starts_with("ERROR: "));
}
