//! LINE Messaging API and LINE Login client.

use async_trait::async_trait;
use confdesk_proto::PushRequest;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{IdentityVerifier, Messenger, VerifiedIdentity, VerifyError};
use crate::config::LineConfig;
use crate::upstream::{UpstreamError, build_client, expect_success};

const SERVICE: &str = "line";

/// Claims returned by `POST /oauth2/v2.1/verify`.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Error body of the verify endpoint.
#[derive(Debug, Default, Deserialize)]
struct VerifyErrorBody {
    #[serde(default)]
    error_description: Option<String>,
}

/// Client for both LINE APIs used by the daemon.
pub struct LineClient {
    api_base: String,
    access_token: Option<String>,
    http: reqwest::Client,
}

impl LineClient {
    /// Create a client from configuration.
    pub fn new(config: &LineConfig) -> Self {
        if config.channel_access_token.is_none() {
            warn!("LINE channel access token not set; pushes will fail");
        }
        info!(api_base = %config.api_base, "LINE client initialized");
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.channel_access_token.clone(),
            http: build_client(Duration::from_secs(config.timeout_secs)),
        }
    }
}

#[async_trait]
impl Messenger for LineClient {
    async fn push(&self, request: &PushRequest) -> Result<serde_json::Value, UpstreamError> {
        let Some(token) = self.access_token.as_deref() else {
            return Err(UpstreamError::NotConfigured {
                service: SERVICE,
                detail: "line.channel_access_token is not set",
            });
        };

        let response = self
            .http
            .post(format!("{}/v2/bot/message/push", self.api_base))
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(UpstreamError::transport(SERVICE))
            .inspect_err(|_| crate::metrics::record_upstream_failure(SERVICE))?;
        let response = expect_success(SERVICE, response).await?;

        // Success bodies are `{}` or `{"sentMessages": [...]}`
        let body = response.bytes().await.map_err(UpstreamError::decode(SERVICE))?;
        let value = if body.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
                service: SERVICE,
                detail: e.to_string(),
            })?
        };

        debug!(to = %request.to, messages = request.messages.len(), "LINE push sent");
        Ok(value)
    }
}

#[async_trait]
impl IdentityVerifier for LineClient {
    async fn verify(
        &self,
        id_token: &str,
        channel_id: &str,
    ) -> Result<VerifiedIdentity, VerifyError> {
        let response = self
            .http
            .post(format!("{}/oauth2/v2.1/verify", self.api_base))
            .form(&[("id_token", id_token), ("client_id", channel_id)])
            .send()
            .await
            .map_err(UpstreamError::transport(SERVICE))
            .inspect_err(|_| crate::metrics::record_upstream_failure(SERVICE))?;

        // 400 means the token itself is bad (expired, wrong audience, forged)
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            let body: VerifyErrorBody = response.json().await.unwrap_or_default();
            let reason = body
                .error_description
                .unwrap_or_else(|| "invalid id token".to_string());
            return Err(VerifyError::Rejected(reason));
        }

        let response = expect_success(SERVICE, response).await?;
        let claims: VerifyResponse = response
            .json()
            .await
            .map_err(UpstreamError::decode(SERVICE))?;

        Ok(VerifiedIdentity {
            user_id: claims.sub,
            name: claims.name,
            picture: claims.picture,
        })
    }
}
