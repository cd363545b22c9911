use crate::ports::{AppConfig, ConfigError, ConfigResult, ConfigStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

pub const API_URL_ENV: &str = "COMMENTS_API_URL";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    request_timeout_seconds: Option<u64>,
    storage_path: Option<PathBuf>,
}

pub struct FileConfigStore {
    config_path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::ReadError("Cannot determine config directory".to_string())
        })?;

        Ok(Self::with_path(config_dir.join("page-comments").join("config.json")))
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    async fn ensure_config_dir(&self) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }
        Ok(())
    }

    async fn read_config_file(&self) -> ConfigResult<ConfigFile> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(_) => {
                // Config file doesn't exist yet, every field takes its default
                return Ok(ConfigFile::default());
            }
        };

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_config(&self) -> ConfigResult<AppConfig> {
        let config_file = self.read_config_file().await?;
        let defaults = AppConfig::default();

        // The environment wins over the file
        let api_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or(config_file.api_url)
            .unwrap_or(defaults.api_url);

        Ok(AppConfig {
            api_url,
            request_timeout_seconds: config_file
                .request_timeout_seconds
                .unwrap_or(defaults.request_timeout_seconds),
            storage_path: config_file.storage_path,
        })
    }

    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()> {
        self.ensure_config_dir().await?;

        let config_file = ConfigFile {
            api_url: Some(config.api_url.clone()),
            request_timeout_seconds: Some(config.request_timeout_seconds),
            storage_path: config.storage_path.clone(),
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PRODUCTION_API_URL;
    use tempfile::TempDir;

    // These tests assume COMMENTS_API_URL is unset in the test environment.

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));

        let config = tokio_test::block_on(store.load_config()).unwrap();
        assert_eq!(config.api_url, PRODUCTION_API_URL);
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.storage_path, None);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("sub").join("config.json"));

        let mut config = AppConfig::default();
        config.use_development_api();
        config.request_timeout_seconds = 5;
        config.storage_path = Some(dir.path().join("storage.json"));
        store.save_config(&config).await.unwrap();

        assert_eq!(store.load_config().await.unwrap(), config);
    }

    #[tokio::test]
    async fn invalid_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").await.unwrap();

        let store = FileConfigStore::with_path(path);
        assert!(matches!(
            store.load_config().await,
            Err(ConfigError::InvalidFormat(_))
        ));
    }
}
