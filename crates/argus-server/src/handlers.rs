use axum::extract::State;
use axum::Json;
use tracing::warn;

use crate::envelope::EventEnvelope;
use crate::error::ApiError;
use crate::state::AppState;
use argus_types::Snapshot;

/// `POST /events` — the hook ingress endpoint. Validates the envelope,
/// converts it to an `InboxEvent`, and hands it to the scheduler; never touches
/// the store directly, since the scheduler is its single writer.
pub async fn post_event(
    State(state): State<AppState>,
    Json(envelope): Json<EventEnvelope>,
) -> Result<(), ApiError> {
    let event = envelope.into_inbox_event()?;
    state.inbox.send(event).await.map_err(|_| {
        warn!("ingress inbox is closed, dropping event");
        ApiError::IngressClosed
    })
}

/// `GET /state` — a one-shot pull of the current snapshot, for clients that don't
/// want a persistent WebSocket connection.
pub async fn get_state(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.publisher.subscribe().borrow().clone())
}
