//! Configuration management
//!
//! This module handles loading, validation, and management of the Sage configuration.
//! Configuration is stored in TOML format at ~/.sage/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **llm**: Provider endpoint, default model and temperature, agent limits
//! - **tools**: arXiv, Wikipedia and web search settings
//! - **server**: Bind address for the chat UI
//!
//! The provider credential is never stored here: it is entered per session.
//! Google search credentials come from the `GOOGLE_API_KEY` and
//! `GOOGLE_CSE_ID` environment variables.
//!
//! # Examples
//!
//! ```no_run
//! use sage_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Default model: {}", config.llm.default_model);
//! # Ok(())
//! # }
//! ```

use sdk::errors::SageError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chat::settings::ModelChoice;

/// Environment variable holding the Google API key
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Environment variable holding the Google custom search engine id
pub const GOOGLE_CSE_ID_ENV: &str = "GOOGLE_CSE_ID";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Retrieval tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Chat UI server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Base URL of the OpenAI-compatible Groq API
    #[serde(default = "default_groq_base_url")]
    pub base_url: String,

    /// Model preselected in the settings surface
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Temperature preselected in the settings surface (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Timeout for each model call in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum think-act-observe iterations per question
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

/// Retrieval tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// arXiv paper lookup
    #[serde(default)]
    pub arxiv: ArxivConfig,

    /// Wikipedia lookup
    #[serde(default)]
    pub wikipedia: WikipediaConfig,

    /// Web search
    #[serde(default)]
    pub web_search: WebSearchConfig,
}

/// arXiv tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivConfig {
    /// arXiv query API endpoint
    #[serde(default = "default_arxiv_base_url")]
    pub base_url: String,

    /// Number of papers to return per query
    #[serde(default = "default_top_k_results")]
    pub top_k_results: usize,

    /// Maximum characters of the rendered observation
    #[serde(default = "default_doc_content_chars_max")]
    pub doc_content_chars_max: usize,
}

/// Wikipedia tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    /// MediaWiki API endpoint
    #[serde(default = "default_wikipedia_base_url")]
    pub base_url: String,

    /// Number of pages to return per query
    #[serde(default = "default_top_k_results")]
    pub top_k_results: usize,

    /// Maximum characters of the rendered observation
    #[serde(default = "default_doc_content_chars_max")]
    pub doc_content_chars_max: usize,
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    /// Google Custom Search endpoint
    #[serde(default = "default_google_base_url")]
    pub base_url: String,

    /// Number of results requested per query
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

/// Chat UI server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Seconds a session may sit idle before it is dropped
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl ServerConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    ModelChoice::default().id().to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_iterations() -> usize {
    15
}

fn default_arxiv_base_url() -> String {
    "https://export.arxiv.org/api/query".to_string()
}

fn default_wikipedia_base_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_google_base_url() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_top_k_results() -> usize {
    2
}

fn default_doc_content_chars_max() -> usize {
    500
}

fn default_num_results() -> usize {
    10
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

fn default_session_ttl_secs() -> u64 {
    3600
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: default_groq_base_url(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: default_arxiv_base_url(),
            top_k_results: default_top_k_results(),
            doc_content_chars_max: default_doc_content_chars_max(),
        }
    }
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            base_url: default_wikipedia_base_url(),
            top_k_results: default_top_k_results(),
            doc_content_chars_max: default_doc_content_chars_max(),
        }
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_google_base_url(),
            num_results: default_num_results(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.sage/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, SageError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, SageError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            SageError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| SageError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    pub fn create_default(path: &Path) -> Result<Self, SageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SageError::Configuration(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();

        let toml_string = toml::to_string_pretty(&config).map_err(|e| {
            SageError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            SageError::Configuration(format!("Failed to write config file: {}", e))
        })?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.sage/config.toml)
    pub fn default_config_path() -> Result<PathBuf, SageError> {
        let home = dirs::home_dir().ok_or_else(|| {
            SageError::Configuration("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".sage").join("config.toml"))
    }

    /// Parsed server bind address
    pub fn bind_addr(&self) -> Result<SocketAddr, SageError> {
        self.server.bind.parse().map_err(|e| {
            SageError::Configuration(format!(
                "Invalid server bind address '{}': {}",
                self.server.bind, e
            ))
        })
    }

    /// Model preselected in the settings surface
    pub fn default_model(&self) -> Result<ModelChoice, SageError> {
        self.llm.default_model.parse()
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Log level is not a tracing level
    /// - Default model or temperature is outside the settings surface
    /// - Any count or limit is zero
    /// - The bind address does not parse
    pub fn validate(&self) -> Result<(), SageError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(SageError::Configuration(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        self.default_model()?;

        let temperature = self.llm.default_temperature;
        if !temperature.is_finite() || !(0.0..=1.0).contains(&temperature) {
            return Err(SageError::Configuration(
                "default_temperature must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(SageError::Configuration(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.server.session_ttl_secs == 0 {
            return Err(SageError::Configuration(
                "session_ttl_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm.max_iterations == 0 {
            return Err(SageError::Configuration(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        let limits = [
            ("tools.arxiv.top_k_results", self.tools.arxiv.top_k_results),
            (
                "tools.arxiv.doc_content_chars_max",
                self.tools.arxiv.doc_content_chars_max,
            ),
            (
                "tools.wikipedia.top_k_results",
                self.tools.wikipedia.top_k_results,
            ),
            (
                "tools.wikipedia.doc_content_chars_max",
                self.tools.wikipedia.doc_content_chars_max,
            ),
            (
                "tools.web_search.num_results",
                self.tools.web_search.num_results,
            ),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(SageError::Configuration(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        self.bind_addr()?;

        Ok(())
    }
}

/// Google search credentials read from the environment
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub api_key: crate::secrets::SecretString,
    pub cse_id: String,
}

impl GoogleCredentials {
    /// Read `GOOGLE_API_KEY` and `GOOGLE_CSE_ID`; both must be non-empty
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            std::env::var(GOOGLE_API_KEY_ENV).ok(),
            std::env::var(GOOGLE_CSE_ID_ENV).ok(),
        )
    }

    /// Build credentials from explicit values; blank values count as missing
    pub fn from_values(api_key: Option<String>, cse_id: Option<String>) -> Option<Self> {
        let api_key = api_key.filter(|k| !k.trim().is_empty())?;
        let cse_id = cse_id.filter(|c| !c.trim().is_empty())?;
        Some(Self {
            api_key: api_key.into(),
            cse_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.llm.default_model, "llama3-8b-8192");
        assert_eq!(config.llm.default_temperature, 0.7);
        assert_eq!(config.tools.arxiv.top_k_results, 2);
        assert_eq!(config.tools.wikipedia.doc_content_chars_max, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.llm.base_url, deserialized.llm.base_url);
        assert_eq!(config.server.bind, deserialized.server.bind);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8501");
        assert_eq!(config.llm.max_iterations, 15);
        assert_eq!(config.server.session_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_zero_session_ttl_rejected() {
        let mut config = Config::default();
        config.server.session_ttl_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(SageError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        let mut config = Config::default();
        config.llm.default_temperature = 1.5;
        assert!(matches!(
            config.validate(),
            Err(SageError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_model_rejected() {
        let mut config = Config::default();
        config.llm.default_model = "gpt-17".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_google_credentials_require_both_values() {
        assert!(GoogleCredentials::from_values(Some("key".into()), None).is_none());
        assert!(GoogleCredentials::from_values(None, Some("cse".into())).is_none());
        assert!(GoogleCredentials::from_values(Some(" ".into()), Some("cse".into())).is_none());

        let creds = GoogleCredentials::from_values(Some("key".into()), Some("cse".into()))
            .unwrap();
        assert_eq!(creds.api_key.unsecure(), "key");
        assert_eq!(creds.cse_id, "cse");
    }
}
