//! Session state
//!
//! `SessionStore` keeps one session's transcript and memory in step;
//! `SessionRegistry` maps session ids to stores for the hosting shells.

pub mod registry;
pub mod store;

pub use registry::{BroadcastSink, SessionHandle, SessionId, SessionRegistry};
pub use store::{validate_user_text, Session, SessionStore, GREETING};
