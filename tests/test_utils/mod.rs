//! Test utilities for integration tests
use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};

use kora::api::AppState;
use kora::api::app;
use kora::core::AppConfig;

/// Creates a test application router with both model providers
/// pointed at the given hostnames (normally a `mockito` server).
pub fn test_app(gemini_api_hostname: &str, deepseek_api_hostname: &str) -> Router {
    let app_config = AppConfig {
        gemini_api_hostname: gemini_api_hostname.to_string(),
        gemini_api_key: String::from("test-gemini-key"),
        gemini_model: String::from("gemini-2.0-flash-exp"),
        deepseek_api_hostname: deepseek_api_hostname.to_string(),
        deepseek_api_key: String::from("test-deepseek-key"),
        deepseek_model: String::from("deepseek-chat"),
        system_message: String::from(
            "You are Kora, a helpful AI assistant. Always say your name is Kora when asked.",
        ),
        chat_api_url: String::from("http://localhost:3000"),
    };
    let app_state = AppState::new(app_config);
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("Response body was not valid utf8")
}
