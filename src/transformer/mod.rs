//! Provider wire formats.
//!
//! Each upstream protocol gets its own module with typed response models and
//! an explicit parse function. Parsing yields one of three things:
//!
//! - `Ok(Some(text))`: the provider produced output
//! - `Ok(None)`: the body was well formed but carried no text
//! - `Err(ParseError)`: the body did not have the expected shape
//!
//! Both providers accept the same single-turn request body, built by
//! [`CompletionPayload::single_user_message`].

pub mod anthropic;
pub mod openai;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Generation cap sent with every completion request.
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Upstream protocol spoken by a real provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    OpenAI,
    Anthropic,
}

impl Protocol {
    /// Vendor name as it appears in human-readable error messages.
    pub const fn display_name(self) -> &'static str {
        match self {
            Protocol::OpenAI => "OpenAI",
            Protocol::Anthropic => "Anthropic",
        }
    }

    /// Path appended to the configured API base.
    pub const fn endpoint_path(self) -> &'static str {
        match self {
            Protocol::OpenAI => openai::CHAT_COMPLETIONS_PATH,
            Protocol::Anthropic => anthropic::MESSAGES_PATH,
        }
    }

    /// Extract the completion text from a successful response body.
    pub fn parse_response(self, body: &[u8]) -> ParseResult {
        match self {
            Protocol::OpenAI => openai::parse_response(body),
            Protocol::Anthropic => anthropic::parse_response(body),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A provider response body that could not be interpreted.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response body is not valid JSON for this provider: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

pub type ParseResult = std::result::Result<Option<String>, ParseError>;

/// Single-turn completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionPayload<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 1],
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> CompletionPayload<'a> {
    pub fn single_user_message(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// Treat empty strings as absent output.
fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let payload = CompletionPayload::single_user_message("gpt-4o-mini", "Hello");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "Hello"}],
                "max_tokens": 1024
            })
        );
    }

    #[test]
    fn test_protocol_paths() {
        assert_eq!(Protocol::OpenAI.endpoint_path(), "/chat/completions");
        assert_eq!(Protocol::Anthropic.endpoint_path(), "/messages");
    }

    #[test]
    fn test_protocol_display() {
        assert_eq!(Protocol::OpenAI.to_string(), "OpenAI");
        assert_eq!(Protocol::Anthropic.to_string(), "Anthropic");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
    }
}
