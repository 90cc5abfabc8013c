//! Unified error handling for confdesk.
//!
//! Each endpoint family has its own error enum because each renders a
//! different JSON envelope. All of them share the same contract: a status
//! per failure class (400 bad input, 401 identity rejected, 404 missing
//! entity, 405 wrong method, 500 upstream or internal failure), a static
//! `error_code()` for log fields, and logging at the point the response is
//! built so handlers only need `?`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use confdesk_proto::{AnalysisFailure, MessageBody, NotifyFailure, ProtoError};
use serde_json::json;
use thiserror::Error;

use crate::pdf::ExtractError;
use crate::store::StoreError;
use crate::upstream::UpstreamError;

fn log_failure(status: StatusCode, code: &'static str, error: &dyn std::error::Error) {
    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), code, error = %error, "Request failed");
    } else {
        tracing::info!(status = status.as_u16(), code, error = %error, "Request rejected");
    }
}

// ============================================================================
// PDF analysis
// ============================================================================

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("invalid multipart body: {0}")]
    Multipart(String),

    #[error("no file field in upload")]
    NoFile,

    #[error("upload has content type {0:?}, expected application/pdf")]
    NotPdf(Option<String>),

    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("only {chars} characters of text extracted")]
    TooLittleText { chars: usize },

    #[error("model call failed: {0}")]
    Model(#[from] UpstreamError),
}

impl AnalyzeError {
    /// Get a static error code string for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Multipart(_) => "invalid_multipart",
            Self::NoFile => "no_file",
            Self::NotPdf(_) => "not_pdf",
            Self::TooLarge { .. } => "too_large",
            Self::Extract(_) => "extract_failed",
            Self::TooLittleText { .. } => "too_little_text",
            Self::Model(_) => "model_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to the uploader.
    fn public_message(&self) -> String {
        match self {
            Self::Multipart(_) => "Invalid form data".into(),
            Self::NoFile => "No file uploaded".into(),
            Self::NotPdf(_) => "File must be a PDF".into(),
            Self::TooLarge { limit } => format!("File is larger than {limit} bytes"),
            Self::Extract(_) => "Failed to extract text from PDF".into(),
            Self::TooLittleText { .. } => {
                "Failed to extract text from PDF: not enough text found".into()
            }
            Self::Model(_) => "Failed to analyze PDF".into(),
        }
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = self.status();
        log_failure(status, self.error_code(), &self);
        (status, Json(AnalysisFailure::new(self.public_message()))).into_response()
    }
}

// ============================================================================
// Login bridging
// ============================================================================

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Missing(ProtoError),

    #[error("redirect not allowed: {0}")]
    RedirectNotAllowed(String),

    #[error("LINE login channel id is not configured")]
    NotConfigured,

    #[error("id token rejected: {0}")]
    InvalidToken(String),

    #[error("claimed line_user_id does not match the id token subject")]
    IdentityMismatch,

    #[error("id token verification failed: {0}")]
    Verify(UpstreamError),

    #[error("backend call failed: {0}")]
    Store(#[from] StoreError),
}

impl LoginError {
    /// Get a static error code string for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::InvalidBody(_) => "invalid_body",
            Self::Missing(_) => "missing_field",
            Self::RedirectNotAllowed(_) => "redirect_not_allowed",
            Self::NotConfigured => "not_configured",
            Self::InvalidToken(_) => "invalid_token",
            Self::IdentityMismatch => "identity_mismatch",
            Self::Verify(_) => "verify_failed",
            Self::Store(_) => "store_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidBody(_) | Self::Missing(_) | Self::RedirectNotAllowed(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidToken(_) | Self::IdentityMismatch => StatusCode::UNAUTHORIZED,
            Self::NotConfigured | Self::Verify(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::MethodNotAllowed => "Method not allowed".into(),
            Self::InvalidBody(_) => "Invalid JSON body".into(),
            Self::Missing(e) => e.to_string(),
            Self::RedirectNotAllowed(_) => "redirect_to is not allowed".into(),
            Self::NotConfigured => "LINE login is not configured".into(),
            Self::InvalidToken(_) => "Invalid id_token".into(),
            Self::IdentityMismatch => "line_user_id does not match id_token".into(),
            Self::Verify(_) => "Failed to verify id_token".into(),
            Self::Store(_) => "Failed to create login link".into(),
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let status = self.status();
        log_failure(status, self.error_code(), &self);
        (status, Json(MessageBody::new(self.public_message()))).into_response()
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Missing(ProtoError),

    #[error("participant {0} not found")]
    ParticipantNotFound(String),

    #[error("participant {0} has no linked LINE account")]
    NotLinked(String),

    #[error("participant lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("push failed: {0}")]
    Push(#[from] UpstreamError),
}

impl NotifyError {
    /// Get a static error code string for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::InvalidBody(_) => "invalid_body",
            Self::Missing(_) => "missing_field",
            Self::ParticipantNotFound(_) => "participant_not_found",
            Self::NotLinked(_) => "not_linked",
            Self::Store(_) => "store_failed",
            Self::Push(_) => "push_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidBody(_) | Self::Missing(_) => StatusCode::BAD_REQUEST,
            Self::ParticipantNotFound(_) | Self::NotLinked(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Push(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> NotifyFailure {
        let (error, details) = match self {
            Self::MethodNotAllowed => ("Method not allowed".to_string(), None),
            Self::InvalidBody(detail) => ("Invalid JSON body".to_string(), Some(detail.clone())),
            Self::Missing(e) => (e.to_string(), None),
            Self::ParticipantNotFound(_) => ("Participant not found".to_string(), None),
            Self::NotLinked(_) => (
                "Participant has no linked LINE account".to_string(),
                None,
            ),
            Self::Store(e) => ("Failed to look up participant".to_string(), Some(e.to_string())),
            Self::Push(e) => ("Failed to send notification".to_string(), Some(e.to_string())),
        };
        NotifyFailure { error, details }
    }
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> Response {
        let status = self.status();
        log_failure(status, self.error_code(), &self);
        (status, Json(self.body())).into_response()
    }
}

// ============================================================================
// Catalog reads
// ============================================================================

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("store call failed: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// Get a static error code string for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "store_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        log_failure(status, self.error_code(), &self);
        let message = match &self {
            Self::Store(_) => "Failed to query the backend".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
