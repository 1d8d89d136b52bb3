//! Session Store
//!
//! Holds one session's visible transcript and the agent's conversational
//! memory, and keeps the two in step. The transcript always starts with the
//! greeting turn. Every completed exchange appends the assistant turn and the
//! matching `(user, assistant)` pair to memory in the same call, so the last
//! memory entry always mirrors the last two transcript turns.

use serde::Serialize;
use sdk::{Exchange, SageError, Turn};

use crate::chat::ExchangeState;

/// First assistant turn of every session
pub const GREETING: &str = "Hi, I'm an AI research assistant. I can search the web, Wikipedia, and arXiv to help answer your questions. What would you like to know?";

const EMPTY_MESSAGE: &str = "Message must not be empty";

/// Transcript and memory of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    transcript: Vec<Turn>,
    memory: Vec<Exchange>,
}

impl Session {
    fn fresh() -> Self {
        Self {
            transcript: vec![Turn::assistant(GREETING)],
            memory: Vec::new(),
        }
    }
}

/// Reject empty or whitespace-only user text
pub fn validate_user_text(text: &str) -> Result<(), SageError> {
    if text.trim().is_empty() {
        return Err(SageError::Validation(EMPTY_MESSAGE.to_string()));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct SessionStore {
    session: Option<Session>,
    state: ExchangeState,
}

impl SessionStore {
    /// Store with no session yet; the first interaction creates it
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session if there is none. Calling it again changes nothing.
    pub fn initialize(&mut self) {
        if self.session.is_none() {
            self.session = Some(Session::fresh());
            self.state = ExchangeState::AwaitingInput;
        }
    }

    /// Discard the transcript and memory and start over from the greeting
    pub fn reset(&mut self) {
        self.session = Some(Session::fresh());
        self.state = ExchangeState::AwaitingInput;
    }

    /// Append a user turn. Memory is untouched until the exchange completes.
    ///
    /// # Errors
    ///
    /// `SageError::Validation` for empty or whitespace-only text, in which
    /// case nothing is recorded.
    pub fn append_user_turn(&mut self, text: &str) -> Result<(), SageError> {
        validate_user_text(text)?;
        self.session_mut().transcript.push(Turn::user(text));
        Ok(())
    }

    /// Append the assistant turn and the completed exchange to memory
    pub fn record_exchange(&mut self, user_text: &str, assistant_text: &str) {
        let session = self.session_mut();
        session.transcript.push(Turn::assistant(assistant_text));
        session
            .memory
            .push(Exchange::new(user_text, assistant_text));
    }

    /// Read-only view of memory for conditioning the agent
    pub fn snapshot_for_agent(&self) -> &[Exchange] {
        self.memory()
    }

    pub fn transcript(&self) -> &[Turn] {
        self.session
            .as_ref()
            .map(|s| s.transcript.as_slice())
            .unwrap_or_default()
    }

    pub fn memory(&self) -> &[Exchange] {
        self.session
            .as_ref()
            .map(|s| s.memory.as_slice())
            .unwrap_or_default()
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn set_state(&mut self, state: ExchangeState) {
        self.state = state;
    }

    fn session_mut(&mut self) -> &mut Session {
        self.session.get_or_insert_with(Session::fresh)
    }
}
