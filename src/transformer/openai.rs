//! OpenAI Chat Completions response parsing.

use super::{non_empty, ParseResult};
use serde::Deserialize;

pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// The subset of a chat completion response the dispatcher reads.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice's message, if any.
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

/// Parse a 2xx chat completion body.
pub fn parse_response(body: &[u8]) -> ParseResult {
    let response: ChatCompletionResponse = serde_json::from_slice(body)?;
    Ok(non_empty(response.first_content()))
}
