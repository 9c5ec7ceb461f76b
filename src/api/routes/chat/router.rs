//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::api::state::AppState;
use crate::chat::{self, ConversationTurn};
use super::public;

type SharedState = Arc<RwLock<AppState>>;

/// Get the stored conversation history for a user id
async fn chat_transcript(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let transcript = state
        .read()
        .expect("Unable to read shared state")
        .history
        .turns(&user_id);

    if transcript.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("No conversation history for {}", user_id),
        )
            .into_response());
    }

    Ok(axum::Json(public::ChatTranscriptResponse { transcript }).into_response())
}

/// Get the next reply for a message, recording the exchange when a
/// user id was supplied
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<axum::Json<public::ChatResponse>, crate::api::public::ApiError> {
    // Snapshot the prior turns and config so no lock is held across
    // the provider calls
    let (prior, config) = {
        let shared_state = state.read().expect("Unable to read shared state");
        let prior = payload
            .user_id
            .as_deref()
            .map(|id| shared_state.history.turns(id))
            .unwrap_or_default();
        (prior, shared_state.config.clone())
    };

    let reply = chat::respond(&payload.message, &prior, &config).await?;

    // Write back from the pre-call snapshot. Concurrent requests for
    // the same id are last-write-wins on the truncated slice.
    if let Some(user_id) = &payload.user_id {
        let mut turns = prior;
        turns.push(ConversationTurn::user(&payload.message));
        turns.push(ConversationTurn::assistant(&reply));
        state
            .write()
            .expect("Unable to write shared state")
            .history
            .replace(user_id, turns);
    }

    Ok(axum::Json(public::ChatResponse { response: reply }))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/{id}", get(chat_transcript))
}
