//! Tool capability trait
//!
//! Every retrieval backend the agent can call (web search, encyclopedia
//! lookup, academic paper lookup) is exposed through the same narrow
//! `query(text) -> text` interface. The engine assembles a fixed set of
//! these at configuration time and never inspects their internals.

use crate::errors::SageError;
use async_trait::async_trait;

/// A single-operation capability the agent can call by name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the agent uses to call the tool (e.g. "wikipedia")
    fn name(&self) -> &str;

    /// One-line description advertised to the model
    fn description(&self) -> &str;

    /// Run a query and return the observation text
    async fn query(&self, input: &str) -> Result<String, SageError>;
}
