//! LINE platform integration.
//!
//! Two seams are exposed to the handlers:
//! - [`Messenger`]: push text messages through the Messaging API
//! - [`IdentityVerifier`]: verify LINE Login id tokens
//!
//! [`LineClient`] implements both against the real API; [`signature`]
//! checks webhook request signatures.

use async_trait::async_trait;
use confdesk_proto::PushRequest;

use crate::upstream::UpstreamError;

pub mod client;
pub mod signature;

pub use client::LineClient;

/// Claims of a verified LINE id token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// LINE user id (`sub`).
    pub user_id: String,
    /// Display name, when the `profile` scope was granted.
    pub name: Option<String>,
    /// Profile picture URL, when the `profile` scope was granted.
    pub picture: Option<String>,
}

/// Verification outcome that is the caller's fault, not the platform's.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("id token rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Push messages; returns the API's JSON answer.
    async fn push(&self, request: &PushRequest) -> Result<serde_json::Value, UpstreamError>;
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify an id token issued for `channel_id`.
    async fn verify(
        &self,
        id_token: &str,
        channel_id: &str,
    ) -> Result<VerifiedIdentity, VerifyError>;
}
