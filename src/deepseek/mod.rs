//! Client for the DeepSeek chat completion API. The API is OpenAI
//! compatible so the request is a single flat message list with the
//! system message at the front.

use anyhow::{Error, Result, anyhow};
use serde_json::{Value, json};

use crate::chat::ConversationTurn;

/// Gets the next completion for `message` given the prior turns.
pub async fn completion(
    message: &str,
    history: &[ConversationTurn],
    api_hostname: &str,
    api_key: &str,
    model: &str,
    system_message: &str,
) -> Result<String, Error> {
    let mut messages = vec![json!({"role": "system", "content": system_message})];
    messages.extend(history.iter().map(|turn| json!(turn)));
    messages.push(json!({"role": "user", "content": message}));

    let payload = json!({
        "model": model,
        "messages": messages,
    });

    let url = format!(
        "{}/v1/chat/completions",
        api_hostname.trim_end_matches("/")
    );
    let response: Value = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("No message in completion response: {}", response))
}
