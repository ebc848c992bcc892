//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::game_store::sql::{DEFAULT_DATABASE_URL, SqlConfig};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAME_CATALOG_CONFIG_PATH";
/// Environment variable overriding the listening port.
const PORT_ENV: &str = "PORT";
/// Environment variable overriding the database URL.
const DATABASE_URL_ENV: &str = "DATABASE_URL";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATIC_DIR: &str = "static";
/// Top-100 listing snapshots imported by the populate route.
const DEFAULT_POPULATE_SOURCES: [&str; 2] = [
    "https://wizz-technical-test-dev.s3.eu-west-3.amazonaws.com/ios.top100.json",
    "https://wizz-technical-test-dev.s3.eu-west-3.amazonaws.com/android.top100.json",
];

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    port: u16,
    database_url: String,
    populate_sources: Vec<String>,
    fetch_timeout: Duration,
    static_dir: PathBuf,
}

impl AppConfig {
    /// Load the configuration from disk and the environment, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = env::var(PORT_ENV) {
            match value.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(err) => warn!(%value, error = %err, "ignoring invalid PORT"),
            }
        }
        if let Some(url) = env::var(DATABASE_URL_ENV).ok().filter(|url| !url.is_empty()) {
            self.database_url = url;
        }
        self
    }

    /// Replace the populate sources, mostly useful to point imports at fixtures.
    pub fn with_populate_sources(mut self, sources: Vec<String>) -> Self {
        self.populate_sources = sources;
        self
    }

    /// Serve unmatched requests from another directory.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Connection settings for the relational store.
    pub fn sql(&self) -> SqlConfig {
        SqlConfig::new(self.database_url.clone())
    }

    /// URLs fetched by the populate route.
    pub fn populate_sources(&self) -> &[String] {
        &self.populate_sources
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Directory served for requests no route matches.
    pub fn static_dir(&self) -> &PathBuf {
        &self.static_dir
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            populate_sources: DEFAULT_POPULATE_SOURCES.map(String::from).to_vec(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    port: Option<u16>,
    database_url: Option<String>,
    populate_sources: Option<Vec<String>>,
    fetch_timeout_secs: Option<u64>,
    static_dir: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            port: value.port.unwrap_or(defaults.port),
            database_url: value.database_url.unwrap_or(defaults.database_url),
            populate_sources: value
                .populate_sources
                .unwrap_or(defaults.populate_sources),
            fetch_timeout: value
                .fetch_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            static_dir: value.static_dir.unwrap_or(defaults.static_dir),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
