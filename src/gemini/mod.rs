//! Client for the Gemini `generateContent` REST API.
//!
//! Gemini takes the system instruction out of band and uses
//! `user`/`model` roles for the turn history, so the shared
//! `ConversationTurn` history gets mapped here rather than passed
//! through as-is.

use anyhow::{Error, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::chat::{ConversationTurn, TurnRole};

#[derive(Serialize, Debug)]
struct Part {
    text: String,
}

#[derive(Serialize, Debug)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn new(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: String,
}

fn to_content(turn: &ConversationTurn) -> Content {
    // Gemini calls the assistant side of the transcript "model"
    let role = match turn.role {
        TurnRole::User => "user",
        TurnRole::Assistant => "model",
    };
    Content::new(role, &turn.content)
}

/// Generates the next reply for `message` given the prior turns.
/// Fails on transport errors, non-2xx responses, and responses with
/// no candidate text.
pub async fn generate(
    message: &str,
    history: &[ConversationTurn],
    api_hostname: &str,
    api_key: &str,
    model: &str,
    system_message: &str,
) -> Result<String, Error> {
    let mut contents: Vec<Content> = history.iter().map(to_content).collect();
    contents.push(Content::new("user", message));

    let payload = GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: system_message.to_string(),
            }],
        },
        contents,
    };

    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        api_hostname.trim_end_matches("/"),
        model
    );
    let response: GenerateContentResponse = reqwest::Client::new()
        .post(url)
        .query(&[("key", api_key)])
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.clone())
        .ok_or_else(|| anyhow!("No candidate text in Gemini response"))
}
