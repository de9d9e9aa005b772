//! Typed capture settings

use crate::domain::clipboard::SnapshotLimits;
use crate::domain::timing::Duration;

/// Default number of clipboard open attempts
pub const DEFAULT_OPEN_RETRIES: u32 = 10;

/// How often and how patiently the clipboard is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRetryPolicy {
    /// Total attempts, at least one is always made
    pub attempts: u32,
    /// Pause between attempts
    pub interval: Duration,
}

impl OpenRetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}

impl Default for OpenRetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_OPEN_RETRIES,
            interval: Duration::default_open_retry_interval(),
        }
    }
}

/// Everything that tunes a selection capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    /// Budget for waiting on the copy to land
    pub timeout: Duration,
    /// Sequence number polling interval
    pub poll_interval: Duration,
    /// Pause after a change before reading
    pub settle_delay: Duration,
    pub limits: SnapshotLimits,
    pub retry: OpenRetryPolicy,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::default_timeout(),
            poll_interval: Duration::default_poll_interval(),
            settle_delay: Duration::default_settle_delay(),
            limits: SnapshotLimits::default(),
            retry: OpenRetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = CaptureSettings::default();
        assert_eq!(settings.timeout.as_millis(), 2000);
        assert_eq!(settings.poll_interval.as_millis(), 10);
        assert_eq!(settings.settle_delay.as_millis(), 30);
        assert_eq!(settings.retry.attempts, 10);
        assert_eq!(settings.retry.interval.as_millis(), 100);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let policy = OpenRetryPolicy {
            attempts: 0,
            interval: Duration::from_millis(1),
        };
        assert_eq!(policy.attempts(), 1);
    }
}
