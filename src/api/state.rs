use crate::chat::HistoryStore;
use crate::core::AppConfig;

pub struct AppState {
    pub history: HistoryStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            history: HistoryStore::new(),
            config,
        }
    }
}
