//! Transport between the session controller and the conversation
//! gateway.

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};

#[async_trait]
pub trait ChatBackend {
    /// Sends a message, with the user id when authenticated, and
    /// returns the reply text.
    async fn send(&self, message: &str, user_id: Option<&str>) -> Result<String, Error>;
}

/// Talks to the gateway over HTTP.
pub struct HttpBackend {
    api_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches("/").to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, message: &str, user_id: Option<&str>) -> Result<String, Error> {
        let mut payload = json!({ "message": message });
        if let Some(id) = user_id {
            payload["userId"] = json!(id);
        }

        let response: Value = self
            .client
            .post(format!("{}/api/chat", self.api_url))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("No response field in gateway reply: {}", response))
    }
}
