//! Inbound chat event webhook.
//!
//! The event is authenticated, decoded and handed to the dispatcher; the
//! response does not wait for the answer.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;

use chatbridge_infra::webhook::authorize;
use chatbridge_types::event::InboundEvent;

use crate::http::error::AppError;
use crate::http::response::RequestClock;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Accepted {
    pub status: &'static str,
    pub event_id: String,
}

/// POST {api_path}
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let clock = RequestClock::start();

    let authorization = headers.get("authorization").and_then(|v| v.to_str().ok());
    authorize(state.config.server.verification_token.as_deref(), authorization)?;

    let event: InboundEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid event payload: {e}")))?;
    let event_id = event.event_id.clone();

    tracing::debug!(%event_id, chat_id = %event.chat_id, "event received");

    if !state.dispatcher.submit(event) {
        return Err(AppError::ShuttingDown);
    }

    let response = clock.finish(Accepted {
        status: "accepted",
        event_id,
    });
    Ok((StatusCode::ACCEPTED, response))
}
