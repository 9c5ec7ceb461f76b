use std::env;

/// The system instruction sent to both model providers. Kora should
/// identify itself consistently no matter which provider answered.
pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "You are Kora, a helpful AI assistant. Always say your name is Kora when asked.";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gemini_api_hostname: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub deepseek_api_hostname: String,
    pub deepseek_api_key: String,
    pub deepseek_model: String,
    pub system_message: String,
    pub chat_api_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = "127.0.0.1";
        let port = "3000";
        let gemini_api_hostname = env::var("KORA_GEMINI_API_HOSTNAME")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
        let gemini_model =
            env::var("KORA_GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-exp".to_string());
        let deepseek_api_hostname = env::var("KORA_DEEPSEEK_API_HOSTNAME")
            .unwrap_or_else(|_| "https://api.deepseek.com".to_string());
        let deepseek_api_key = env::var("DEEPSEEK_API_KEY")
            .unwrap_or_else(|_| "thiswontworkfordeepseek".to_string());
        let deepseek_model =
            env::var("KORA_DEEPSEEK_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string());
        let system_message =
            env::var("KORA_SYSTEM_MESSAGE").unwrap_or_else(|_| DEFAULT_SYSTEM_MESSAGE.to_string());
        let chat_api_url = env::var("KORA_CHAT_API_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            gemini_api_hostname,
            gemini_api_key,
            gemini_model,
            deepseek_api_hostname,
            deepseek_api_key,
            deepseek_model,
            system_message,
            chat_api_url,
        }
    }
}
