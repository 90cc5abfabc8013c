//! `POST /api/notify`: push a decorated message to one participant.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use confdesk_proto::{NotifyRequest, NotifyResponse, PushRequest};
use tracing::{Instrument, info};

use crate::error::NotifyError;
use crate::state::AppState;
use crate::telemetry::spans;

pub async fn notify(
    State(state): State<AppState>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<Json<NotifyResponse>, NotifyError> {
    let Json(request) = payload.map_err(|e| NotifyError::InvalidBody(e.body_text()))?;
    let (participant_id, message, kind) = request.validate().map_err(NotifyError::Missing)?;

    let span = spans::notification(participant_id.as_str(), kind.as_str());
    async move {
        let participant = state
            .store
            .get_participant(participant_id.as_str())
            .await?
            .ok_or_else(|| NotifyError::ParticipantNotFound(participant_id.to_string()))?;

        let line_user_id = participant
            .linked_line_user()
            .ok_or_else(|| NotifyError::NotLinked(participant_id.to_string()))?;

        let result = state
            .messenger
            .push(&PushRequest::text(line_user_id, kind.format(message)))
            .await?;

        crate::metrics::record_notification(kind.as_str());
        info!("Notification sent");
        Ok::<_, NotifyError>(Json(NotifyResponse {
            success: true,
            result,
        }))
    }
    .instrument(span)
    .await
}

/// Answer for any method other than POST.
pub async fn method_not_allowed() -> NotifyError {
    NotifyError::MethodNotAllowed
}
