use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub const PRODUCTION_API_URL: &str = "https://khalil-stemmler-backend.herokuapp.com";
pub const DEVELOPMENT_API_URL: &str = "http://localhost:9021";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    ReadError(String),

    #[error("Failed to write configuration: {0}")]
    WriteError(String),

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub request_timeout_seconds: u64,
    /// File backing the local pending-comment storage. `None` uses the
    /// platform data directory.
    pub storage_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: PRODUCTION_API_URL.to_string(),
            request_timeout_seconds: 30,
            storage_path: None,
        }
    }
}

impl AppConfig {
    /// Point at the local development backend.
    pub fn use_development_api(&mut self) {
        self.api_url = DEVELOPMENT_API_URL.to_string();
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_config(&self) -> ConfigResult<AppConfig>;
    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()>;
}
