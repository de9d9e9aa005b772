//! Keystroke port interface

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Keystroke errors
#[derive(Debug, Clone, Error)]
pub enum KeystrokeError {
    #[error("Failed to send keystroke: {0}")]
    SendFailed(String),

    #[error("Keystroke injection is not supported on this platform")]
    Unsupported,
}

/// Clipboard shortcuts the injector can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Control+C
    Copy,
    /// Control+V
    Paste,
}

impl Shortcut {
    /// Letter pressed together with Control
    pub const fn letter(&self) -> char {
        match self {
            Self::Copy => 'c',
            Self::Paste => 'v',
        }
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => write!(f, "Ctrl+C"),
            Self::Paste => write!(f, "Ctrl+V"),
        }
    }
}

/// Port for keystroke injection
#[async_trait]
pub trait Keystroke: Send + Sync {
    /// Release stuck modifiers, then send a Control+letter shortcut to the
    /// focused application.
    async fn send_shortcut(&self, shortcut: Shortcut) -> Result<(), KeystrokeError>;

    async fn send_copy(&self) -> Result<(), KeystrokeError> {
        self.send_shortcut(Shortcut::Copy).await
    }

    async fn send_paste(&self) -> Result<(), KeystrokeError> {
        self.send_shortcut(Shortcut::Paste).await
    }
}

/// Blanket implementation for boxed keystroke types
#[async_trait]
impl Keystroke for Box<dyn Keystroke> {
    async fn send_shortcut(&self, shortcut: Shortcut) -> Result<(), KeystrokeError> {
        self.as_ref().send_shortcut(shortcut).await
    }
}
