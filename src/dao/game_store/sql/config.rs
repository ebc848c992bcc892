use std::time::Duration;

use sea_orm::ConnectOptions;

/// Default database used when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://games.db?mode=rwc";
const IN_MEMORY_URL: &str = "sqlite::memory:";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(8);

/// Runtime configuration describing how to reach the relational database.
#[derive(Debug, Clone)]
pub struct SqlConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

impl SqlConfig {
    /// Construct a configuration for the given connection URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: None,
        }
    }

    /// Private in-memory SQLite database.
    ///
    /// Every SQLite connection to `:memory:` opens its own database, so the pool is pinned to a
    /// single connection.
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY_URL).with_max_connections(1)
    }

    /// Cap the size of the connection pool.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub(super) fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        options
            .connect_timeout(CONNECT_TIMEOUT)
            .sqlx_logging(false);
        if let Some(max) = self.max_connections {
            options.max_connections(max).min_connections(max.min(1));
        }
        options
    }
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_URL)
    }
}
