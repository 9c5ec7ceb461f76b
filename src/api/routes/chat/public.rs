//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::chat::ConversationTurn;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    // The id is trusted as supplied; nothing verifies the caller owns
    // it
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Serialize)]
pub struct ChatTranscriptResponse {
    pub transcript: Vec<ConversationTurn>,
}
