//! Session inspection and reset handlers.
//!
//! Endpoints:
//! - GET    /api/v1/sessions/{chat_id}/messages - Message log snapshot
//! - DELETE /api/v1/sessions/{chat_id}          - Drop one session
//! - DELETE /api/v1/sessions                    - Drop every session

use axum::extract::{Path, State};
use serde::Serialize;

use chatbridge_types::chat::{ChatTurn, ConversationState};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionMessages {
    pub state: ConversationState,
    pub max_messages: usize,
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ResetResult {
    pub reset: String,
    pub remaining: usize,
}

/// GET /api/v1/sessions/{chat_id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<ApiResponse<SessionMessages>, AppError> {
    let clock = RequestClock::start();

    let session = state
        .sessions
        .get(&chat_id)
        .ok_or_else(|| AppError::SessionNotFound(chat_id.clone()))?;

    let data = SessionMessages {
        state: session.state(),
        max_messages: session.messages().max_messages(),
        messages: session.messages().list(),
    };

    Ok(clock
        .finish(data)
        .with_link("self", &format!("/api/v1/sessions/{chat_id}/messages"))
        .with_link("session", &format!("/api/v1/sessions/{chat_id}")))
}

/// DELETE /api/v1/sessions/{chat_id}
pub async fn reset_session(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> ApiResponse<ResetResult> {
    let clock = RequestClock::start();
    state.sessions.reset_one(&chat_id);

    clock.finish(ResetResult {
        reset: chat_id,
        remaining: state.sessions.len(),
    })
}

/// DELETE /api/v1/sessions
pub async fn reset_all_sessions(State(state): State<AppState>) -> ApiResponse<ResetResult> {
    let clock = RequestClock::start();
    state.sessions.reset_all();

    clock.finish(ResetResult {
        reset: "all".to_string(),
        remaining: state.sessions.len(),
    })
}
