use std::sync::Arc;

use crate::config::{ServerConfig, StoreBackend};
use crate::leaderboard::ApiError;
use crate::store::{LeaderboardStore, MemoryStore};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the leaderboard is not configured
    pub store: Option<Arc<dyn LeaderboardStore>>,
    pub max_entries_per_mode: usize,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        match config.backend {
            StoreBackend::Memory => {
                Self::with_store(Arc::new(MemoryStore::new()), config.max_entries_per_mode)
            }
            StoreBackend::Disabled => Self::disabled(),
        }
    }

    pub fn with_store(store: Arc<dyn LeaderboardStore>, max_entries_per_mode: usize) -> Self {
        Self {
            store: Some(store),
            max_entries_per_mode,
        }
    }

    pub fn disabled() -> Self {
        Self {
            store: None,
            max_entries_per_mode: 0,
        }
    }

    pub fn store(&self) -> Result<&Arc<dyn LeaderboardStore>, ApiError> {
        self.store.as_ref().ok_or(ApiError::NotConfigured)
    }
}
