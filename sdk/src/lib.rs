//! Sage SDK
//!
//! Shared library providing traits and types for Sage components.
//! This crate is used by the engine and by anything that plugs tools or
//! progress observers into it.

/// Error types and handling
pub mod errors;

/// Progress events and observers
pub mod progress;

/// Tool capability trait
pub mod tool;

/// Conversation types
pub mod types;

// Re-export commonly used types
pub use errors::{SageError, SageErrorExt};
pub use progress::{AgentEvent, NullSink, ProgressSink};
pub use tool::Tool;
pub use types::{Exchange, Role, Turn};
