//! Error types and handling
//!
//! This module provides the error taxonomy shared by the Sage engine and its
//! tools. All errors implement the `SageErrorExt` trait which provides
//! user-friendly hints and indicates whether errors are recoverable.
//!
//! # Taxonomy
//!
//! - **Validation**: empty or whitespace-only chat input, rejected before any
//!   state changes
//! - **Configuration**: missing credential, out-of-range settings, unreadable
//!   or invalid config files
//! - **AgentExecution**: any failure raised while the agent was running
//!   (provider error, tool failure, parse error, timeout)
//! - **Session**: busy or unknown sessions in the hosting shell
//!
//! None of these terminate a session. Hints never include the credential
//! supplied by the user.
//!
//! # Examples
//!
//! ```
//! use sdk::errors::{SageError, SageErrorExt};
//!
//! let error = SageError::Validation("message is empty".to_string());
//! println!("Hint: {}", error.user_hint());
//! assert!(error.is_recoverable());
//! ```

use thiserror::Error;

/// Trait for Sage error extensions
///
/// Provides additional context for errors: a hint that is safe to show to
/// the person at the keyboard, and whether the session can simply carry on.
pub trait SageErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable without operator action
    fn is_recoverable(&self) -> bool;
}

/// Main error type
#[derive(Debug, Error)]
pub enum SageError {
    // Input errors
    #[error("Invalid input: {0}")]
    Validation(String),

    // Configuration errors (settings, credential, config file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Agent errors
    #[error("Agent execution failed: {0}")]
    AgentExecution(String),

    // Session errors
    #[error("Session is busy answering a previous message")]
    SessionBusy,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    // Tool errors
    #[error("Tool error: {0}")]
    Tool(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SageErrorExt for SageError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Validation(_) => "Type a question before sending",
            Self::Configuration(_) => "Check your API key and settings in the sidebar",
            Self::AgentExecution(_) => "The assistant failed to answer. Try again",
            Self::SessionBusy => "Wait for the current answer to finish",
            Self::SessionNotFound(_) => "Start a new chat session",
            Self::Tool(_) => "A search tool failed. Try rephrasing the question",
            Self::Network(_) => "Network operation failed. Check your connection",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Only a broken local file system needs someone to step in.
        !matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SageError::Validation("message is empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: message is empty");

        let err = SageError::Configuration("missing key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing key");
    }

    #[test]
    fn test_recoverability() {
        assert!(SageError::SessionBusy.is_recoverable());
        assert!(SageError::AgentExecution("boom".to_string()).is_recoverable());

        let io = SageError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!io.is_recoverable());
    }

    #[test]
    fn test_hints_are_static() {
        let secret = "gsk_live_secret";
        let err = SageError::Configuration(secret.to_string());
        assert!(!err.user_hint().contains(secret));
    }
}
