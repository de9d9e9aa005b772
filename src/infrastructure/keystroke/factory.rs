//! Keystroke tool factory

use std::fmt;
use std::str::FromStr;

use crate::application::ports::Keystroke;

use super::enigo::EnigoKeystroke;
use super::noop::NoOpKeystroke;

/// User preference for keystroke tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeystrokeToolPreference {
    /// Use the enigo library (default)
    #[default]
    Enigo,
    /// Send nothing. The clipboard protocol still runs.
    Disabled,
}

impl fmt::Display for KeystrokeToolPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeystrokeToolPreference::Enigo => write!(f, "enigo"),
            KeystrokeToolPreference::Disabled => write!(f, "none"),
        }
    }
}

/// Error type for parsing keystroke tool preference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeystrokeToolError {
    pub value: String,
    pub valid_options: &'static str,
}

impl fmt::Display for ParseKeystrokeToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid keystroke tool '{}'. Valid options: {}",
            self.value, self.valid_options
        )
    }
}

impl std::error::Error for ParseKeystrokeToolError {}

impl FromStr for KeystrokeToolPreference {
    type Err = ParseKeystrokeToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enigo" => Ok(KeystrokeToolPreference::Enigo),
            "none" => Ok(KeystrokeToolPreference::Disabled),
            _ => Err(ParseKeystrokeToolError {
                value: s.to_string(),
                valid_options: "enigo, none",
            }),
        }
    }
}

/// Create a keystroke adapter using the specified preference.
pub fn create_keystroke(preference: KeystrokeToolPreference) -> Box<dyn Keystroke> {
    match preference {
        KeystrokeToolPreference::Enigo => Box::new(EnigoKeystroke::new()),
        KeystrokeToolPreference::Disabled => Box::new(NoOpKeystroke::new()),
    }
}
