//! TOML settings file under the user's config directory

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

const APP_DIR: &str = "selgrab";
const FILE_NAME: &str = "config.toml";

/// `config.toml` in `$XDG_CONFIG_HOME/selgrab` (or the platform equivalent)
#[derive(Debug, Clone)]
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::in_dir(base)
    }

    /// Store under `base/selgrab/config.toml`
    pub fn in_dir(base: impl AsRef<Path>) -> Self {
        Self::with_path(base.as_ref().join(APP_DIR).join(FILE_NAME))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn decode(&self, content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", self.path.display(), e)))
    }

    fn encode(config: &AppConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    async fn ensure_parent(&self) -> Result<(), ConfigError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string())),
            _ => Ok(()),
        }
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => self.decode(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No config file, using defaults");
                Ok(AppConfig::empty())
            }
            Err(e) => Err(ConfigError::ReadError(e.to_string())),
        }
    }

    /// Written to a sibling file first and renamed over, so a crash never
    /// leaves a half-written config behind.
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.ensure_parent().await?;
        let staged = self.path.with_extension("toml.tmp");
        fs::write(&staged, Self::encode(config)?)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        fs::rename(&staged, &self.path)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    async fn init(&self) -> Result<(), ConfigError> {
        self.ensure_parent().await?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    ConfigError::AlreadyExists(self.path.display().to_string())
                }
                _ => ConfigError::WriteError(e.to_string()),
            })?;
        let content = Self::encode(&AppConfig::defaults())?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> XdgConfigStore {
        XdgConfigStore::in_dir(dir.path())
    }

    #[test]
    fn in_dir_nests_app_folder() {
        let store = XdgConfigStore::in_dir("/base");
        assert_eq!(store.path(), Path::new("/base/selgrab/config.toml"));
    }

    #[test]
    fn default_path_names_app() {
        let path = XdgConfigStore::new().path().to_string_lossy().into_owned();
        assert!(path.contains("selgrab"));
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn decode_reads_selgrab_keys() {
        let store = XdgConfigStore::with_path("config.toml");
        let config = store
            .decode(
                r#"
timeout = "1500ms"
max_format_size = "1MB"
open_retries = 4
keystroke_tool = "none"
"#,
            )
            .unwrap();
        assert_eq!(config.timeout.as_deref(), Some("1500ms"));
        assert_eq!(config.max_format_size.as_deref(), Some("1MB"));
        assert_eq!(config.open_retries, Some(4));
        assert_eq!(config.keystroke_tool.as_deref(), Some("none"));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn decode_error_names_file() {
        let store = XdgConfigStore::with_path("/etc/selgrab.toml");
        match store.decode("open_retries = \"many\"") {
            Err(ConfigError::ParseError(message)) => assert!(message.contains("/etc/selgrab.toml")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load().await.unwrap(), AppConfig::empty());
    }

    #[tokio::test]
    async fn init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.init().await.unwrap();
        assert_eq!(store.load().await.unwrap(), AppConfig::defaults());

        let err = store.init().await.unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn save_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let config = AppConfig {
            settle_delay: Some("45ms".to_string()),
            ..AppConfig::empty()
        };

        store.save(&config).await.unwrap();

        assert_eq!(store.load().await.unwrap(), config);
        assert!(!store.path().with_extension("toml.tmp").exists());
    }

    #[tokio::test]
    async fn failed_update_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let err = store
            .update(Box::new(|_: &mut AppConfig| {
                Err(ConfigError::ValidationError {
                    key: "timeout".into(),
                    message: "nope".into(),
                })
            }))
            .await
            .unwrap_err();

        assert!(matches!(err, ConfigError::ValidationError { .. }));
        assert!(!store.path().exists());
    }
}
