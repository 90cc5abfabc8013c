//! Inbound LINE webhook envelope.
//!
//! Decoding is lenient: an event that fails to decode is dropped on its own
//! instead of failing the whole delivery, since the platform adds event kinds
//! and fields without notice.

use serde::Deserialize;

use crate::error::Result;

/// The `{destination, events}` body LINE posts to a webhook URL.
#[derive(Debug, Clone, Default)]
pub struct WebhookEnvelope {
    /// Bot user id that received the events.
    pub destination: Option<String>,
    /// Events that decoded.
    pub events: Vec<WebhookEvent>,
    /// Events that were present but could not be decoded.
    pub skipped: usize,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

impl WebhookEnvelope {
    /// Decode a raw request body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_slice(body)?;
        let total = raw.events.len();
        let events: Vec<WebhookEvent> = raw
            .events
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        Ok(Self {
            destination: raw.destination,
            skipped: total - events.len(),
            events,
        })
    }
}

/// One webhook event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// Event type (`message`, `follow`, `unfollow`, `postback`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// Who triggered the event.
    #[serde(default)]
    pub source: Option<EventSource>,
    /// Token for the reply API.
    #[serde(default)]
    pub reply_token: Option<String>,
    /// Message payload for `message` events.
    #[serde(default)]
    pub message: Option<EventMessage>,
}

impl WebhookEvent {
    /// The sending user's id, when the source carries one.
    pub fn user_id(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.user_id.as_deref())
    }

    /// The text of a text message event.
    pub fn text(&self) -> Option<&str> {
        match &self.message {
            Some(m) if m.kind == "text" => m.text.as_deref(),
            _ => None,
        }
    }
}

/// Event source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// `user`, `group` or `room`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Sending user.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Group the event happened in.
    #[serde(default)]
    pub group_id: Option<String>,
    /// Room the event happened in.
    #[serde(default)]
    pub room_id: Option<String>,
}

/// Message payload of a `message` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventMessage {
    /// `text`, `image`, `sticker`, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Message id.
    #[serde(default)]
    pub id: Option<String>,
    /// Text for text messages.
    #[serde(default)]
    pub text: Option<String>,
}
