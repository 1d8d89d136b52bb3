//! Working memory for a single agent run
//!
//! Holds the messages sent to the model: system prompt, replayed exchanges,
//! the prompt, then tool calls and observations as the run progresses. When
//! the estimated size passes the context limit, whole replayed exchanges are
//! dropped oldest first, then whole tool steps (call plus observation). The
//! system prompt, the prompt and the newest tool step always stay.

use crate::llm::{Message, MessageRole};
use sdk::Exchange;

/// Default context limit in tokens (the smallest supported model has 8192)
const DEFAULT_CONTEXT_LIMIT: usize = 7000;

/// Rough estimate: 1 token ≈ 4 characters
const CHARS_PER_TOKEN: usize = 4;

/// Per-message overhead for role and framing
const MESSAGE_OVERHEAD_TOKENS: usize = 10;

/// Replayed exchanges and tool steps are both two messages long
const PAIR: usize = 2;

#[derive(Debug, Clone)]
pub struct WorkingMemory {
    messages: Vec<Message>,
    context_limit: usize,
    token_count: usize,

    /// Index of the seeded prompt; everything before it (after the system
    /// prompt) is replayed history
    prompt_index: Option<usize>,
}

impl Default for WorkingMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_CONTEXT_LIMIT)
    }

    pub fn with_limit(context_limit: usize) -> Self {
        Self {
            messages: Vec::new(),
            context_limit,
            token_count: 0,
            prompt_index: None,
        }
    }

    /// Seed the memory for a new run.
    ///
    /// Each prior exchange is replayed as a user message followed by an
    /// assistant message, oldest first, before the prompt.
    pub fn seed(system_prompt: &str, history: &[Exchange], prompt: &str) -> Self {
        Self::seed_with_limit(DEFAULT_CONTEXT_LIMIT, system_prompt, history, prompt)
    }

    pub fn seed_with_limit(
        context_limit: usize,
        system_prompt: &str,
        history: &[Exchange],
        prompt: &str,
    ) -> Self {
        let mut memory = Self::with_limit(context_limit);
        memory.push(Message::system(system_prompt));
        for exchange in history {
            memory.push(Message::user(&exchange.user));
            memory.push(Message::assistant(&exchange.assistant));
        }
        memory.prompt_index = Some(memory.messages.len());
        memory.push(Message::user(prompt));
        memory.trim_messages();
        memory
    }

    pub fn add_message(&mut self, message: Message) {
        self.push(message);
        self.trim_messages();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, message: Message) {
        self.token_count += Self::estimate_tokens(&message);
        self.messages.push(message);
    }

    fn over_limit(&self) -> bool {
        self.token_count > self.context_limit
    }

    fn trim_messages(&mut self) {
        let history_start = usize::from(
            self.messages
                .first()
                .is_some_and(|m| m.role == MessageRole::System),
        );

        // Replayed exchanges, oldest first
        while self.over_limit() {
            match self.prompt_index {
                Some(prompt) if prompt >= history_start + PAIR => {
                    self.remove_pair(history_start);
                    self.prompt_index = Some(prompt - PAIR);
                }
                _ => break,
            }
        }

        // Tool steps after the prompt, keeping the newest one
        let steps_start = self.prompt_index.map_or(history_start, |p| p + 1);
        while self.over_limit() && self.messages.len() >= steps_start + 2 * PAIR {
            self.remove_pair(steps_start);
        }
    }

    fn remove_pair(&mut self, at: usize) {
        for removed in self.messages.drain(at..at + PAIR) {
            self.token_count = self
                .token_count
                .saturating_sub(Self::estimate_tokens(&removed));
        }
    }

    fn estimate_tokens(message: &Message) -> usize {
        message.content.chars().count().div_ceil(CHARS_PER_TOKEN) + MESSAGE_OVERHEAD_TOKENS
    }
}
