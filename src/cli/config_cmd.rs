//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::clipboard::ByteSize;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::timing::Duration;
use crate::infrastructure::KeystrokeToolPreference;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS, VALID_LOG_LEVELS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store
        .update(Box::new(|config: &mut AppConfig| apply_value(config, key, value)))
        .await?;
    let stored = read_value(&config, key);
    presenter.success(&format!("{} = {}", key, stored.as_deref().unwrap_or(value)));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;
    presenter.output(read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Read a config value as it would be written back
fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "timeout" => config.timeout.clone(),
        "poll_interval" => config.poll_interval.clone(),
        "settle_delay" => config.settle_delay.clone(),
        "max_format_size" => config.max_format_size.clone(),
        "max_total_size" => config.max_total_size.clone(),
        "open_retries" => config.open_retries.map(|n| n.to_string()),
        "open_retry_interval" => config.open_retry_interval.clone(),
        "keystroke_tool" => config.keystroke_tool.clone(),
        "log_level" => config.log_level.clone(),
        _ => None,
    }
}

/// Validate a value and store it under its key
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "timeout" | "poll_interval" | "settle_delay" | "open_retry_interval" => {
            let duration = value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            if duration.as_millis() == 0 {
                return Err(invalid("Value must be greater than zero".to_string()));
            }
            let slot = match key {
                "timeout" => &mut config.timeout,
                "poll_interval" => &mut config.poll_interval,
                "settle_delay" => &mut config.settle_delay,
                _ => &mut config.open_retry_interval,
            };
            *slot = Some(value.to_string());
        }
        "max_format_size" | "max_total_size" => {
            value
                .parse::<ByteSize>()
                .map_err(|e| invalid(e.to_string()))?;
            if key == "max_format_size" {
                config.max_format_size = Some(value.to_string());
            } else {
                config.max_total_size = Some(value.to_string());
            }
        }
        "open_retries" => {
            let retries = value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("Value must be a positive whole number".to_string()))?;
            config.open_retries = Some(retries);
        }
        "keystroke_tool" => {
            let tool = value
                .parse::<KeystrokeToolPreference>()
                .map_err(|e| invalid(e.to_string()))?;
            config.keystroke_tool = Some(tool.to_string());
        }
        "log_level" => {
            let level = value.to_lowercase();
            if !VALID_LOG_LEVELS.contains(&level.as_str()) {
                return Err(invalid(format!(
                    "Invalid value '{}'. Valid options: {}",
                    value,
                    VALID_LOG_LEVELS.join(", ")
                )));
            }
            config.log_level = Some(level);
        }
        _ => return Err(invalid("Unknown key".to_string())),
    }
    Ok(())
}
