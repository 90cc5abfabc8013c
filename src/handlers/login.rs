//! `POST /api/line-login`: exchange a LINE Login id token for a backend
//! magic link.
//!
//! The id token is verified with LINE before anything is written; the
//! caller's identity claims are only used as fallbacks for profile fields
//! the token does not carry.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use confdesk_proto::{LineAccount, LoginRequest, LoginResponse};
use serde_json::json;
use tracing::{Instrument, info};

use crate::error::LoginError;
use crate::line::VerifyError;
use crate::state::AppState;
use crate::telemetry::{request_id, spans};

pub async fn line_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, LoginError> {
    let Json(request) = payload.map_err(|e| LoginError::InvalidBody(e.body_text()))?;
    let request_id = request_id();
    bridge(state, request)
        .instrument(spans::login(&request_id))
        .await
}

/// Answer for any method other than POST.
pub async fn method_not_allowed() -> LoginError {
    LoginError::MethodNotAllowed
}

async fn bridge(state: AppState, request: LoginRequest) -> Result<Json<LoginResponse>, LoginError> {
    let id_token = request.id_token().map_err(LoginError::Missing)?;
    let login = &state.config.line.login;

    let redirect_to = match request.redirect_to() {
        Some(redirect) if !login.redirect_allowed(redirect) => {
            return Err(LoginError::RedirectNotAllowed(redirect.to_string()));
        }
        Some(redirect) => Some(redirect.to_string()),
        None => login.default_redirect.clone(),
    };

    let channel_id = login
        .channel_id
        .as_deref()
        .ok_or(LoginError::NotConfigured)?;

    let identity = state
        .verifier
        .verify(id_token, channel_id)
        .await
        .map_err(|e| match e {
            VerifyError::Rejected(reason) => LoginError::InvalidToken(reason),
            VerifyError::Upstream(e) => LoginError::Verify(e),
        })?;

    if request
        .claimed_line_user_id()
        .is_some_and(|claimed| claimed != identity.user_id)
    {
        return Err(LoginError::IdentityMismatch);
    }

    let display_name = identity.name.clone().or_else(|| request.name.clone());
    let picture_url = identity.picture.clone().or_else(|| request.picture.clone());
    let email = synthetic_email(&identity.user_id, &login.email_domain);

    let metadata = json!({
        "provider": "line",
        "line_user_id": identity.user_id,
        "name": display_name,
        "picture": picture_url,
    });
    let created = state.store.ensure_auth_user(&email, metadata).await?;

    let link = state
        .store
        .generate_magic_link(&email, redirect_to.as_deref())
        .await?;

    state
        .store
        .upsert_line_account(&LineAccount {
            line_user_id: identity.user_id.clone(),
            user_id: link.user_id.clone(),
            display_name,
            picture_url,
            updated_at: chrono::Utc::now(),
        })
        .await?;

    crate::metrics::record_magic_link();
    info!(
        line_user_id = %identity.user_id,
        user_id = %link.user_id,
        new_user = created.is_some(),
        "Magic link issued"
    );

    Ok(Json(LoginResponse {
        url: link.url,
        user_id: link.user_id,
        line_user_id: identity.user_id,
    }))
}

/// Backend email standing in for a LINE identity.
///
/// LINE user ids are `U` followed by 32 hex digits, so the local part is
/// always a valid address.
pub fn synthetic_email(line_user_id: &str, domain: &str) -> String {
    format!("line_{}@{}", line_user_id.to_lowercase(), domain)
}
