//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::capture::{CaptureSettings, OpenRetryPolicy, DEFAULT_OPEN_RETRIES};
use crate::domain::clipboard::{
    ByteSize, SnapshotLimits, DEFAULT_MAX_FORMAT_SIZE, DEFAULT_MAX_TOTAL_SIZE,
};
use crate::domain::timing::Duration;

/// Default keystroke tool
pub const DEFAULT_KEYSTROKE_TOOL: &str = "enigo";

/// Default log level when neither RUST_LOG nor -v is given
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub timeout: Option<String>,
    pub poll_interval: Option<String>,
    pub settle_delay: Option<String>,
    pub max_format_size: Option<String>,
    pub max_total_size: Option<String>,
    pub open_retries: Option<u32>,
    pub open_retry_interval: Option<String>,
    pub keystroke_tool: Option<String>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            timeout: Some(Duration::default_timeout().to_string()),
            poll_interval: Some(Duration::default_poll_interval().to_string()),
            settle_delay: Some(Duration::default_settle_delay().to_string()),
            max_format_size: Some(DEFAULT_MAX_FORMAT_SIZE.to_string()),
            max_total_size: Some(DEFAULT_MAX_TOTAL_SIZE.to_string()),
            open_retries: Some(DEFAULT_OPEN_RETRIES),
            open_retry_interval: Some(Duration::default_open_retry_interval().to_string()),
            keystroke_tool: Some(DEFAULT_KEYSTROKE_TOOL.to_string()),
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            timeout: other.timeout.or(self.timeout),
            poll_interval: other.poll_interval.or(self.poll_interval),
            settle_delay: other.settle_delay.or(self.settle_delay),
            max_format_size: other.max_format_size.or(self.max_format_size),
            max_total_size: other.max_total_size.or(self.max_total_size),
            open_retries: other.open_retries.or(self.open_retries),
            open_retry_interval: other.open_retry_interval.or(self.open_retry_interval),
            keystroke_tool: other.keystroke_tool.or(self.keystroke_tool),
            log_level: other.log_level.or(self.log_level),
        }
    }

    fn parse_or<T: std::str::FromStr>(value: &Option<String>, default: T) -> T {
        value
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    /// Get timeout as parsed Duration, or default if not set/invalid
    pub fn timeout_or_default(&self) -> Duration {
        Self::parse_or(&self.timeout, Duration::default_timeout())
    }

    pub fn poll_interval_or_default(&self) -> Duration {
        Self::parse_or(&self.poll_interval, Duration::default_poll_interval())
    }

    pub fn settle_delay_or_default(&self) -> Duration {
        Self::parse_or(&self.settle_delay, Duration::default_settle_delay())
    }

    pub fn max_format_size_or_default(&self) -> ByteSize {
        Self::parse_or(&self.max_format_size, DEFAULT_MAX_FORMAT_SIZE)
    }

    pub fn max_total_size_or_default(&self) -> ByteSize {
        Self::parse_or(&self.max_total_size, DEFAULT_MAX_TOTAL_SIZE)
    }

    pub fn open_retries_or_default(&self) -> u32 {
        self.open_retries.unwrap_or(DEFAULT_OPEN_RETRIES)
    }

    pub fn open_retry_interval_or_default(&self) -> Duration {
        Self::parse_or(
            &self.open_retry_interval,
            Duration::default_open_retry_interval(),
        )
    }

    /// Get keystroke tool preference, or "enigo" if not set
    pub fn keystroke_tool_or_default(&self) -> &str {
        self.keystroke_tool
            .as_deref()
            .unwrap_or(DEFAULT_KEYSTROKE_TOOL)
    }

    pub fn log_level_or_default(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Build typed capture settings from the merged config
    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            timeout: self.timeout_or_default(),
            poll_interval: self.poll_interval_or_default(),
            settle_delay: self.settle_delay_or_default(),
            limits: SnapshotLimits {
                max_format_size: self.max_format_size_or_default(),
                max_total_size: self.max_total_size_or_default(),
            },
            retry: OpenRetryPolicy {
                attempts: self.open_retries_or_default(),
                interval: self.open_retry_interval_or_default(),
            },
        }
    }
}
