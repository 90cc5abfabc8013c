//! Login bridging endpoint payloads.

use serde::{Deserialize, Serialize};

use crate::error::{ProtoError, Result};

/// Body of a login bridging request, as posted by the LIFF front end.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    /// LINE id token from `liff.getIDToken()`.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Claimed LINE user id. Checked against the verified token subject.
    #[serde(default)]
    pub line_user_id: Option<String>,
    /// Claimed display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Claimed profile picture URL.
    #[serde(default)]
    pub picture: Option<String>,
    /// Where the magic link should land after sign-in.
    #[serde(default)]
    pub redirect_to: Option<String>,
}

impl LoginRequest {
    /// The id token, rejecting absent or blank values.
    pub fn id_token(&self) -> Result<&str> {
        non_blank(self.id_token.as_deref()).ok_or(ProtoError::MissingField("id_token"))
    }

    /// The claimed LINE user id, ignoring blank values.
    pub fn claimed_line_user_id(&self) -> Option<&str> {
        non_blank(self.line_user_id.as_deref())
    }

    /// The requested redirect, ignoring blank values.
    pub fn redirect_to(&self) -> Option<&str> {
        non_blank(self.redirect_to.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Successful login bridging response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// One-time magic link.
    pub url: String,
    /// Backend auth user id.
    pub user_id: String,
    /// Verified LINE user id.
    pub line_user_id: String,
}

/// `{message}` error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    /// Human-readable reason.
    pub message: String,
}

impl MessageBody {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
