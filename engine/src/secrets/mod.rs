//! Credential handling
//!
//! The provider credential is supplied per session and only ever held in a
//! `SecretString`. Anything that may end up in front of the user or in the
//! session memory (agent error text in particular) goes through `scrub` first.

pub mod string;

pub use string::SecretString;

use regex::Regex;
use std::sync::OnceLock;

const REDACTED: &str = "[REDACTED]";

/// Regex patterns for detecting common secret formats.
/// These are compiled once and reused.
static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Initializes and returns the secret detection patterns.
///
/// Patterns match:
/// - Groq API keys: gsk_[a-zA-Z0-9]{20,}
/// - OpenAI-style keys: sk-[a-zA-Z0-9-_]{20,}
/// - Google API keys: AIza[0-9A-Za-z-_]{35}
/// - Bearer tokens: Bearer\s+[^\s]{20,}
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        [
            r"gsk_[a-zA-Z0-9]{20,}",
            r"sk-[a-zA-Z0-9\-_]{20,}",
            r"AIza[0-9A-Za-z\-_]{35}",
            r"Bearer\s+[^\s]{20,}",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

/// Remove the session credential and anything that looks like an API key
/// from `text`.
pub fn scrub(text: &str, credential: Option<&SecretString>) -> String {
    let mut result = text.to_string();

    if let Some(credential) = credential.filter(|c| !c.is_blank()) {
        result = result.replace(credential.unsecure(), REDACTED);
    }

    for pattern in get_secret_patterns() {
        result = pattern.replace_all(&result, REDACTED).to_string();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_session_credential() {
        let key = SecretString::new("my-custom-key");
        let scrubbed = scrub("auth failed for key my-custom-key", Some(&key));
        assert_eq!(scrubbed, "auth failed for key [REDACTED]");
    }

    #[test]
    fn test_scrub_known_patterns() {
        let text = "Invalid API Key gsk_abcdefghijklmnopqrstuvwxyz012345 provided";
        let scrubbed = scrub(text, None);
        assert!(!scrubbed.contains("gsk_abcdef"));
        assert!(scrubbed.contains(REDACTED));

        let text = "header was Bearer abcdefghijklmnopqrstuvwxyz";
        assert!(!scrub(text, None).contains("abcdefghijklmnop"));
    }

    #[test]
    fn test_scrub_leaves_plain_text_alone() {
        assert_eq!(scrub("rate limited", None), "rate limited");
        let blank = SecretString::new("");
        assert_eq!(scrub("rate limited", Some(&blank)), "rate limited");
    }
}
