//! Outbound LINE Messaging API payloads.

use serde::{Deserialize, Serialize};

/// Maximum characters of a LINE text message.
pub const MAX_TEXT_LEN: usize = 5000;

/// A `{"type": "text"}` message object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "text")]
pub struct TextMessage {
    /// Message text, capped at [`MAX_TEXT_LEN`] characters.
    pub text: String,
}

impl TextMessage {
    /// Build a text message, cutting it to the platform limit.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let text = match text.char_indices().nth(MAX_TEXT_LEN) {
            Some((cut, _)) => text[..cut].to_string(),
            None => text,
        };
        Self { text }
    }
}

/// Body of `POST /v2/bot/message/push`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRequest {
    /// User, group or room id.
    pub to: String,
    /// Up to five message objects.
    pub messages: Vec<TextMessage>,
}

impl PushRequest {
    /// A push carrying one text message.
    pub fn text(to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            messages: vec![TextMessage::new(text)],
        }
    }
}
