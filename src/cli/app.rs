//! Application runners for each command

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::application::ports::{ClipboardApi, ConfigStore, Keystroke};
use crate::application::{SelectionCaptureUseCase, SelectionWatcher};
use crate::domain::capture::CaptureSettings;
use crate::domain::clipboard::ByteSize;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::timing::Duration;
use crate::infrastructure::logging::LOG_ENV_VAR;
use crate::infrastructure::{
    create_keystroke, system_clipboard, system_mouse_hook, KeystrokeToolPreference,
    XdgConfigStore,
};

use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

type SystemCapture = SelectionCaptureUseCase<Box<dyn ClipboardApi>, Box<dyn Keystroke>>;

/// Settings resolved from the merged config
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub settings: CaptureSettings,
    pub keystroke_tool: KeystrokeToolPreference,
}

impl RunOptions {
    /// Validate every configured value and build typed settings
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        check_parse::<Duration>("timeout", &config.timeout)?;
        check_parse::<Duration>("poll_interval", &config.poll_interval)?;
        check_parse::<Duration>("settle_delay", &config.settle_delay)?;
        check_parse::<Duration>("open_retry_interval", &config.open_retry_interval)?;
        check_parse::<ByteSize>("max_format_size", &config.max_format_size)?;
        check_parse::<ByteSize>("max_total_size", &config.max_total_size)?;

        let keystroke_tool = config
            .keystroke_tool_or_default()
            .parse::<KeystrokeToolPreference>()
            .map_err(|e| ConfigError::ValidationError {
                key: "keystroke_tool".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            settings: config.capture_settings(),
            keystroke_tool,
        })
    }
}

fn check_parse<T>(key: &str, value: &Option<String>) -> Result<(), ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .map(|_| ())
            .map_err(|e| ConfigError::ValidationError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(()),
    }
}

fn build_capture(options: &RunOptions, presenter: &Presenter) -> Result<SystemCapture, ExitCode> {
    let clipboard = system_clipboard().map_err(|e| {
        presenter.error(&e.to_string());
        ExitCode::from(EXIT_ERROR)
    })?;
    let keystroke = create_keystroke(options.keystroke_tool);
    Ok(SelectionCaptureUseCase::new(
        clipboard,
        keystroke,
        options.settings,
    ))
}

/// Capture the current selection and print it
pub async fn run_capture(options: RunOptions, json: bool) -> ExitCode {
    let presenter = Presenter::new();
    let capture = match build_capture(&options, &presenter) {
        Ok(capture) => capture,
        Err(code) => return code,
    };

    let shutdown = ShutdownSignal::new();
    shutdown.setup();

    let outcome = capture
        .capture(options.settings.timeout, &shutdown.token())
        .await;
    debug!(result = %outcome.result, elapsed_ms = outcome.elapsed_ms, "Capture finished");

    if json {
        if let Err(e) = presenter.output_json(&outcome) {
            presenter.error(&format!("Failed to encode report: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    } else if let Some(ref text) = outcome.text {
        presenter.output(text);
    } else {
        presenter.error(&presenter.describe_outcome(&outcome));
    }

    if outcome.text.is_some() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// Print the clipboard text
pub async fn run_get(options: RunOptions) -> ExitCode {
    let presenter = Presenter::new();
    let capture = match build_capture(&options, &presenter) {
        Ok(capture) => capture,
        Err(code) => return code,
    };

    match capture.get_text().await {
        Ok(Some(text)) => {
            presenter.output(&text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(None) => {
            presenter.warn("Clipboard holds no text");
            ExitCode::from(EXIT_ERROR)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Replace the clipboard contents with text
pub async fn run_set(options: RunOptions, text: &str) -> ExitCode {
    let presenter = Presenter::new();
    let capture = match build_capture(&options, &presenter) {
        Ok(capture) => capture,
        Err(code) => return code,
    };

    match capture.set_text(text).await {
        Ok(()) => {
            presenter.success("Copied to clipboard");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Paste text into the focused window and put the clipboard back
pub async fn run_paste(options: RunOptions, text: &str) -> ExitCode {
    let presenter = Presenter::new();
    let capture = match build_capture(&options, &presenter) {
        Ok(capture) => capture,
        Err(code) => return code,
    };

    match capture.paste_text(text).await {
        Ok(()) => {
            presenter.success("Pasted into window");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Print every new selection until Ctrl+C
pub async fn run_watch(options: RunOptions) -> ExitCode {
    let mut presenter = Presenter::new();
    let capture = match build_capture(&options, &presenter) {
        Ok(capture) => Arc::new(capture),
        Err(code) => return code,
    };

    let watcher = SelectionWatcher::new(capture, system_mouse_hook());
    if let Err(e) = watcher.start().await {
        presenter.error(&format!("Failed to start watching: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }
    let mut selections = watcher.subscribe();

    let shutdown = ShutdownSignal::new();
    shutdown.setup();
    presenter.start_spinner("Watching selections (Ctrl+C to stop)");

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            received = selections.recv() => match received {
                Ok(text) => presenter.output_above_spinner(&text),
                Err(RecvError::Lagged(skipped)) => {
                    presenter.warn(&format!("Skipped {} selections", skipped));
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    watcher.stop().await;
    presenter.stop_spinner();
    presenter.info("Stopped watching");
    ExitCode::from(EXIT_SUCCESS)
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            Presenter::new().warn(&format!("Ignoring config file: {}", e));
            AppConfig::empty()
        }
    };

    // SELGRAB_TIMEOUT reaches us through the CLI layer
    let env_config = AppConfig {
        log_level: env::var(LOG_ENV_VAR).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve() {
        let options = RunOptions::from_config(&AppConfig::defaults()).unwrap();
        assert_eq!(options.settings, CaptureSettings::default());
        assert_eq!(options.keystroke_tool, KeystrokeToolPreference::Enigo);
    }

    #[test]
    fn invalid_timeout_is_reported_by_key() {
        let config = AppConfig {
            timeout: Some("whenever".to_string()),
            ..AppConfig::defaults()
        };
        match RunOptions::from_config(&config) {
            Err(ConfigError::ValidationError { key, .. }) => assert_eq!(key, "timeout"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn invalid_keystroke_tool_is_rejected() {
        let config = AppConfig {
            keystroke_tool: Some("xdotool".to_string()),
            ..AppConfig::defaults()
        };
        assert!(RunOptions::from_config(&config).is_err());
    }

    #[test]
    fn disabled_keystroke_tool_resolves() {
        let config = AppConfig {
            keystroke_tool: Some("none".to_string()),
            timeout: Some("250ms".to_string()),
            ..AppConfig::empty()
        };
        let options = RunOptions::from_config(&config).unwrap();
        assert_eq!(options.keystroke_tool, KeystrokeToolPreference::Disabled);
        assert_eq!(options.settings.timeout.as_millis(), 250);
    }
}
