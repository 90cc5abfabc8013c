//! Shared plumbing for outbound HTTP calls.
//!
//! Every hosted service (backend, model, LINE) gets one `reqwest::Client`
//! built here with a timeout and user agent, and every response goes through
//! [`expect_success`] so non-2xx statuses surface as [`UpstreamError::Status`]
//! with the body attached for the logs.

use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// User agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("confdesk/", env!("CARGO_PKG_VERSION"));

/// Longest response body kept in an error.
const MAX_ERROR_BODY: usize = 512;

/// Errors from a hosted service call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} response could not be decoded: {detail}")]
    Decode {
        service: &'static str,
        detail: String,
    },

    #[error("{service} is not configured: {detail}")]
    NotConfigured {
        service: &'static str,
        detail: &'static str,
    },
}

impl UpstreamError {
    /// The service that failed, for metrics labeling.
    pub fn service(&self) -> &'static str {
        match self {
            Self::Transport { service, .. }
            | Self::Status { service, .. }
            | Self::Decode { service, .. }
            | Self::NotConfigured { service, .. } => service,
        }
    }

    /// HTTP status returned by the service, if it answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Transport { service, source }
    }

    pub(crate) fn decode(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |e| Self::Decode {
            service,
            detail: e.to_string(),
        }
    }
}

/// Build the client for one hosted service.
pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Turn a non-2xx response into [`UpstreamError::Status`].
pub async fn expect_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if let Some((cut, _)) = body.char_indices().nth(MAX_ERROR_BODY) {
        body.truncate(cut);
    }

    crate::metrics::record_upstream_failure(service);
    Err(UpstreamError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}
