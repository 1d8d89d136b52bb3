//! Integration tests for configuration management
//!
//! These tests verify that `Config` can be written, read back and validated
//! from real files.

use sage_engine::chat::ModelChoice;
use sage_engine::config::Config;
use sdk::SageError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_create_default_writes_loadable_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let created = Config::create_default(&path).unwrap();
    assert!(path.exists());

    let loaded = Config::load_from_path(&path).unwrap();
    assert_eq!(loaded.core.log_level, created.core.log_level);
    assert_eq!(loaded.llm.default_model, created.llm.default_model);
    assert_eq!(loaded.server.bind, "127.0.0.1:8501");
    assert_eq!(loaded.default_model().unwrap(), ModelChoice::Llama3);
}

#[test]
fn test_partial_file_takes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[llm]
default_model = "Mixtral-8x7b-32768"
default_temperature = 0.3

[tools.wikipedia]
top_k_results = 5
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.default_model().unwrap(), ModelChoice::Mixtral);
    assert!((config.llm.default_temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.tools.wikipedia.top_k_results, 5);
    assert_eq!(config.tools.arxiv.top_k_results, 2);
    assert_eq!(config.tools.arxiv.doc_content_chars_max, 500);
    assert_eq!(config.llm.max_iterations, 15);
    assert_eq!(config.core.log_level, "info");
}

#[test]
fn test_full_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[core]
log_level = "debug"

[llm]
base_url = "http://localhost:9000/v1"
default_model = "gemma-7b-it"
default_temperature = 1.0
timeout_secs = 30
max_iterations = 4

[tools.arxiv]
base_url = "http://localhost:9001/api/query"
top_k_results = 1
doc_content_chars_max = 2000

[tools.web_search]
num_results = 3

[server]
bind = "0.0.0.0:9090"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.llm.base_url, "http://localhost:9000/v1");
    assert_eq!(config.default_model().unwrap(), ModelChoice::Gemma);
    assert_eq!(config.llm.timeout_secs, 30);
    assert_eq!(config.llm.max_iterations, 4);
    assert_eq!(config.tools.arxiv.doc_content_chars_max, 2000);
    assert_eq!(config.tools.web_search.num_results, 3);
    assert_eq!(config.bind_addr().unwrap().port(), 9090);
}

#[test]
fn test_invalid_values_are_rejected() {
    let cases = [
        ("[core]\nlog_level = \"loud\"\n", "log level"),
        ("[llm]\ndefault_model = \"gpt-4\"\n", "model"),
        ("[llm]\ndefault_temperature = 1.5\n", "temperature"),
        ("[llm]\nmax_iterations = 0\n", "max_iterations"),
        ("[tools.arxiv]\ntop_k_results = 0\n", "top_k_results"),
        ("[server]\nbind = \"not-an-address\"\n", "bind"),
        ("[server]\nsession_ttl_secs = 0\n", "session_ttl_secs"),
    ];

    for (contents, label) in cases {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();

        let result = Config::load_from_path(&path);
        assert!(
            matches!(result, Err(SageError::Configuration(_))),
            "expected {} to be rejected",
            label
        );
    }
}

#[test]
fn test_malformed_toml_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[llm\ndefault_model = ").unwrap();

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(matches!(err, SageError::Configuration(_)));
}

#[test]
fn test_missing_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from_path(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SageError::Configuration(_)));
}
