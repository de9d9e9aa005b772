//! Settings storage port

use std::path::Path;

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Edit applied by [`ConfigStore::update`]
pub type ConfigEdit<'a> = Box<dyn FnOnce(&mut AppConfig) -> Result<(), ConfigError> + Send + 'a>;

/// Where selgrab keeps its settings between runs
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Stored settings. A store with nothing written yet reads as an empty config.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Replace the stored settings.
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Write the default settings. Fails with `AlreadyExists` rather than
    /// overwrite anything.
    async fn init(&self) -> Result<(), ConfigError>;

    /// Location shown to the user by `config path` and `config init`
    fn path(&self) -> &Path;

    /// Load, apply one edit, save. Nothing is written if the edit fails.
    async fn update(&self, edit: ConfigEdit<'_>) -> Result<AppConfig, ConfigError> {
        let mut config = self.load().await?;
        edit(&mut config)?;
        self.save(&config).await?;
        Ok(config)
    }
}
