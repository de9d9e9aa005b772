//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default selection capture budget (2 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Default clipboard sequence polling interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Default pause after a clipboard change before reading it
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 30;

/// Default pause between clipboard open attempts
pub const DEFAULT_OPEN_RETRY_INTERVAL_MS: u64 = 100;

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default capture timeout (2 seconds)
    pub const fn default_timeout() -> Self {
        Self::from_millis(DEFAULT_TIMEOUT_MS)
    }

    /// Default poll interval (10 milliseconds)
    pub const fn default_poll_interval() -> Self {
        Self::from_millis(DEFAULT_POLL_INTERVAL_MS)
    }

    /// Default settle delay (30 milliseconds)
    pub const fn default_settle_delay() -> Self {
        Self::from_millis(DEFAULT_SETTLE_DELAY_MS)
    }

    /// Default interval between clipboard open retries (100 milliseconds)
    pub const fn default_open_retry_interval() -> Self {
        Self::from_millis(DEFAULT_OPEN_RETRY_INTERVAL_MS)
    }

    /// Get duration in seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl From<u64> for Duration {
    fn from(ms: u64) -> Self {
        Self::from_millis(ms)
    }
}

impl From<Duration> for u64 {
    fn from(d: Duration) -> Self {
        d.milliseconds
    }
}

impl From<Duration> for StdDuration {
    fn from(d: Duration) -> Self {
        d.as_std()
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse a duration string into a Duration value object.
    /// Supported formats: "500ms", "2s", "1m", "1m30s", "1s250ms"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        let err = || DurationParseError {
            input: s.to_string(),
        };

        let mut total_ms: u64 = 0;
        let mut current_num = String::new();
        let mut found_any = false;
        let mut chars = input.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch.is_ascii_digit() {
                current_num.push(ch);
                continue;
            }
            if current_num.is_empty() {
                return Err(err());
            }
            let value: u64 = current_num.parse().map_err(|_| err())?;
            let factor = match ch {
                'm' if chars.peek() == Some(&'s') => {
                    chars.next();
                    1
                }
                'm' => 60_000,
                's' => 1000,
                _ => return Err(err()),
            };
            total_ms = value
                .checked_mul(factor)
                .and_then(|ms| total_ms.checked_add(ms))
                .ok_or_else(err)?;
            current_num.clear();
            found_any = true;
        }

        // Leftover digits without a unit are ambiguous
        if !current_num.is_empty() || !found_any {
            return Err(err());
        }

        Ok(Self {
            milliseconds: total_ms,
        })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.milliseconds;
        if ms % 1000 != 0 || ms == 0 {
            return write!(f, "{}ms", ms);
        }

        let total_secs = ms / 1000;
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_milliseconds() {
        let d: Duration = "500ms".parse().unwrap();
        assert_eq!(d.as_millis(), 500);
    }

    #[test]
    fn parse_seconds() {
        let d: Duration = "2s".parse().unwrap();
        assert_eq!(d.as_millis(), 2000);
    }

    #[test]
    fn parse_minutes() {
        let d: Duration = "1m".parse().unwrap();
        assert_eq!(d.as_secs(), 60);
    }

    #[test]
    fn parse_combined() {
        let d: Duration = "1m30s".parse().unwrap();
        assert_eq!(d.as_secs(), 90);

        let d: Duration = "1s250ms".parse().unwrap();
        assert_eq!(d.as_millis(), 1250);
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        let d: Duration = "  2S ".parse().unwrap();
        assert_eq!(d.as_millis(), 2000);
    }

    #[test]
    fn parse_zero_is_allowed() {
        let d: Duration = "0ms".parse().unwrap();
        assert_eq!(d.as_millis(), 0);
    }

    #[test]
    fn parse_rejects_bare_number() {
        assert!("30".parse::<Duration>().is_err());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Duration>().is_err());
        assert!("abc".parse::<Duration>().is_err());
        assert!("10h".parse::<Duration>().is_err());
        assert!("s".parse::<Duration>().is_err());
    }

    #[test]
    fn display_formats() {
        assert_eq!(Duration::from_millis(30).to_string(), "30ms");
        assert_eq!(Duration::from_millis(2000).to_string(), "2s");
        assert_eq!(Duration::from_secs(60).to_string(), "1m");
        assert_eq!(Duration::from_secs(90).to_string(), "1m30s");
        assert_eq!(Duration::from_millis(0).to_string(), "0ms");
    }

    #[test]
    fn defaults() {
        assert_eq!(Duration::default_timeout().as_millis(), 2000);
        assert_eq!(Duration::default_poll_interval().as_millis(), 10);
        assert_eq!(Duration::default_settle_delay().as_millis(), 30);
        assert_eq!(Duration::default_open_retry_interval().as_millis(), 100);
    }

    #[test]
    fn converts_to_std() {
        let d = Duration::from_millis(1500);
        assert_eq!(d.as_std(), StdDuration::from_millis(1500));
    }
}
