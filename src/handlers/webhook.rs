//! `POST /api/line-webhook`: inbound LINE events.
//!
//! The platform retries deliveries that do not get a 2xx, so this endpoint
//! answers `OK` no matter what happens below it. Failures are logged and
//! counted, never returned.

use axum::extract::State;
use axum::http::HeaderMap;
use bytes::Bytes;
use confdesk_proto::{PushRequest, WebhookEnvelope, WebhookEvent};
use tracing::{Instrument, debug, info, warn};

use crate::line::signature::{self, SIGNATURE_HEADER};
use crate::state::AppState;
use crate::telemetry::{request_id, spans};

pub async fn line_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> &'static str {
    let request_id = request_id();

    if let Some(secret) = state.config.line.channel_secret.as_deref() {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !signature::verify(secret, &body, provided) {
            warn!(request_id = %request_id, "Webhook signature mismatch, dropping delivery");
            crate::metrics::record_webhook_event("bad_signature");
            return "OK";
        }
    }

    let envelope = match WebhookEnvelope::parse(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Malformed webhook body");
            crate::metrics::record_webhook_event("malformed");
            return "OK";
        }
    };

    let span = spans::webhook(&request_id, envelope.events.len());
    dispatch(&state, envelope).instrument(span).await;
    "OK"
}

async fn dispatch(state: &AppState, envelope: WebhookEnvelope) {
    if envelope.skipped > 0 {
        warn!(skipped = envelope.skipped, "Undecodable webhook events dropped");
    }
    if envelope.events.is_empty() {
        // The console's "Verify" button sends an empty delivery.
        info!("Webhook delivery without events");
        return;
    }

    for event in &envelope.events {
        crate::metrics::record_webhook_event(&event.kind);
        if let Err(e) = handle_event(state, event).await {
            warn!(kind = %event.kind, error = %e, "Webhook event failed");
        }
    }
}

async fn handle_event(state: &AppState, event: &WebhookEvent) -> anyhow::Result<()> {
    match event.kind.as_str() {
        "follow" => {
            let Some(user_id) = event.user_id() else {
                debug!("Follow event without user id");
                return Ok(());
            };
            let welcome = &state.config.line.webhook.welcome_message;
            state
                .messenger
                .push(&PushRequest::text(user_id, welcome))
                .await?;
            info!(user_id, "Welcome message sent");
        }
        "message" => {
            let Some(text) = event.text() else {
                debug!("Non-text message ignored");
                return Ok(());
            };
            let Some(forward_to) = state.config.line.webhook.forward_to.as_deref() else {
                debug!("Message forwarding disabled");
                return Ok(());
            };
            let sender = sender_display(state, event).await;
            state
                .messenger
                .push(&PushRequest::text(forward_to, &forward_text(&sender, text)))
                .await?;
            debug!(from = %sender, "Message forwarded");
        }
        other => debug!(kind = other, "Webhook event ignored"),
    }
    Ok(())
}

/// Answer for any method other than POST.
pub async fn acknowledge() -> &'static str {
    "OK"
}

/// Participant name for a linked sender, else the raw LINE user id.
async fn sender_display(state: &AppState, event: &WebhookEvent) -> String {
    let Some(user_id) = event.user_id() else {
        return "unknown".to_string();
    };
    match state.store.find_participant_by_line_user(user_id).await {
        Ok(Some(participant)) => participant.name,
        Ok(None) => user_id.to_string(),
        Err(e) => {
            warn!(user_id, error = %e, "Participant lookup failed");
            user_id.to_string()
        }
    }
}

/// Text pushed to the forwarding target.
pub fn forward_text(display: &str, text: &str) -> String {
    format!("[{display}] {text}")
}
