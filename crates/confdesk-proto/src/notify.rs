//! Notification endpoint payloads.

use serde::{Deserialize, Serialize};

use crate::error::{ProtoError, Result};
use crate::id::FlexibleId;

/// Category of a notification, selecting its text decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Organiser announcement.
    Announcement,
    /// Upcoming session reminder.
    Reminder,
    /// Room or time change.
    ScheduleChange,
    /// Plain message.
    #[default]
    #[serde(other)]
    General,
}

impl NotificationKind {
    /// Decorate a message for delivery.
    pub fn format(self, message: &str) -> String {
        match self {
            Self::Announcement => format!("📢 {message}"),
            Self::Reminder => format!("⏰ Reminder: {message}"),
            Self::ScheduleChange => format!("🔄 Schedule change: {message}"),
            Self::General => message.to_string(),
        }
    }

    /// Static label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
            Self::Reminder => "reminder",
            Self::ScheduleChange => "schedule_change",
            Self::General => "general",
        }
    }
}

/// Body of a notification request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    /// Participant to notify.
    #[serde(default)]
    pub participant_id: Option<FlexibleId>,
    /// Message text.
    #[serde(default)]
    pub message: Option<String>,
    /// Decoration; absent means general.
    #[serde(default, rename = "type")]
    pub kind: Option<NotificationKind>,
}

impl NotifyRequest {
    /// Return `(participant_id, message, kind)`, rejecting blank required fields.
    pub fn validate(&self) -> Result<(&FlexibleId, &str, NotificationKind)> {
        let participant = self
            .participant_id
            .as_ref()
            .filter(|id| !id.is_blank())
            .ok_or(ProtoError::MissingField("participantId"))?;
        let message = self
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or(ProtoError::MissingField("message"))?;
        Ok((participant, message, self.kind.unwrap_or_default()))
    }
}

/// Successful notification response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyResponse {
    /// Always true.
    pub success: bool,
    /// Body returned by the push API.
    pub result: serde_json::Value,
}

/// `{error, details}` failure body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyFailure {
    /// Short reason.
    pub error: String,
    /// Underlying cause, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
