mod app_config;

pub use app_config::{AppConfig, DEFAULT_KEYSTROKE_TOOL, DEFAULT_LOG_LEVEL};
