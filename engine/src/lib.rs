//! Sage Engine Library
//!
//! This library provides the core functionality of the Sage research
//! assistant. It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Credential handling module
pub mod secrets;

/// LLM provider abstraction layer
pub mod llm;

/// Retrieval tools (web search, Wikipedia, arXiv)
pub mod tools;

/// Agent loop module
pub mod agent;

/// Session store and registry
pub mod session;

/// Chat controller and settings surface
pub mod chat;

/// Chat UI server
pub mod server;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
