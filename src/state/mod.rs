use std::sync::Arc;

use crate::{config::AppConfig, dao::game_store::GameStore};

/// Shared handle passed to every handler.
pub type SharedState = Arc<AppState>;

/// Central application state holding the store handle and outbound HTTP client.
pub struct AppState {
    game_store: Arc<dyn GameStore>,
    http_client: reqwest::Client,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        game_store: Arc<dyn GameStore>,
        http_client: reqwest::Client,
        config: AppConfig,
    ) -> SharedState {
        Arc::new(Self {
            game_store,
            http_client,
            config,
        })
    }

    /// Handle to the installed game store.
    pub fn game_store(&self) -> Arc<dyn GameStore> {
        Arc::clone(&self.game_store)
    }

    /// Client used for the populate imports.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Runtime configuration the server was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by a fresh in-memory database, for tests.
    pub(crate) async fn in_memory(config: AppConfig) -> SharedState {
        use crate::dao::game_store::sql::{SqlConfig, SqlGameStore};

        let store = SqlGameStore::connect(SqlConfig::in_memory())
            .await
            .expect("in-memory database");
        Self::new(Arc::new(store), reqwest::Client::new(), config)
    }
}
