//! Anthropic Messages response parsing.

use super::{non_empty, ParseResult};
use serde::Deserialize;

pub const MESSAGES_PATH: &str = "/messages";

/// Value sent in the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The subset of a Messages API response the dispatcher reads.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// Anthropic content block types.
///
/// Only text blocks matter here; everything else (tool use, thinking, ...) is
/// skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: Option<String>,
    },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    /// Text of the first text block. Later text blocks are ignored even when
    /// the first one is empty.
    pub fn first_text(self) -> Option<String> {
        self.content.into_iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.unwrap_or_default()),
            ContentBlock::Other => None,
        })
    }
}

/// Parse a 2xx Messages API body.
pub fn parse_response(body: &[u8]) -> ParseResult {
    let response: MessagesResponse = serde_json::from_slice(body)?;
    Ok(non_empty(response.first_text()))
}
