//! Conversation gateway core: per-user rolling history and the
//! primary/fallback model call.

use std::collections::HashMap;

use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::core::AppConfig;
use crate::{deepseek, gemini};

/// Maximum number of turns retained per user. Older turns are evicted
/// first.
pub const HISTORY_WINDOW: usize = 20;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum TurnRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// A single entry in a user's conversation history. The serialized
/// form is also the message shape the chat completion API consumes.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: &str) -> Self {
        Self {
            role: TurnRole::User,
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.to_string(),
        }
    }
}

/// In-memory conversation history keyed by user id. Entries are
/// created lazily on first write, never deleted, and lost on restart.
#[derive(Default)]
pub struct HistoryStore {
    entries: HashMap<String, Vec<ConversationTurn>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the stored turns for a user, oldest
    /// first. Unknown users get an empty transcript.
    pub fn turns(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.entries.get(user_id).cloned().unwrap_or_default()
    }

    /// Replaces a user's history with the given turns, keeping only
    /// the most recent `HISTORY_WINDOW` entries. Callers write back a
    /// snapshot taken before the model call, so concurrent writers to
    /// the same key are last-write-wins rather than merged.
    pub fn replace(&mut self, user_id: &str, mut turns: Vec<ConversationTurn>) {
        let overflow = turns.len().saturating_sub(HISTORY_WINDOW);
        if overflow > 0 {
            turns.drain(..overflow);
        }
        self.entries.insert(user_id.to_string(), turns);
    }
}

/// Gets the next reply for a message given the prior turns. Tries
/// Gemini first and falls back to DeepSeek on any failure. The
/// fallback is a single attempt with no retries; if it also fails the
/// whole call fails.
pub async fn respond(
    message: &str,
    history: &[ConversationTurn],
    config: &AppConfig,
) -> Result<String, Error> {
    match gemini::generate(
        message,
        history,
        &config.gemini_api_hostname,
        &config.gemini_api_key,
        &config.gemini_model,
        &config.system_message,
    )
    .await
    {
        Ok(reply) => Ok(reply),
        Err(err) => {
            tracing::warn!("Gemini call failed, falling back to DeepSeek: {}", err);
            deepseek::completion(
                message,
                history,
                &config.deepseek_api_hostname,
                &config.deepseek_api_key,
                &config.deepseek_model,
                &config.system_message,
            )
            .await
        }
    }
}
