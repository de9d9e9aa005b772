//! No-op keystroke adapter

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{Keystroke, KeystrokeError, Shortcut};

/// No-op keystroke adapter that does nothing
///
/// Used for dry runs where the clipboard protocol should run without
/// touching the focused application.
pub struct NoOpKeystroke;

impl NoOpKeystroke {
    /// Create a new no-op keystroke adapter
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpKeystroke {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Keystroke for NoOpKeystroke {
    async fn send_shortcut(&self, shortcut: Shortcut) -> Result<(), KeystrokeError> {
        debug!(%shortcut, "Keystrokes disabled, not sending");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_always_succeeds() {
        let keystroke = NoOpKeystroke::new();
        assert!(keystroke.send_copy().await.is_ok());
        assert!(keystroke.send_paste().await.is_ok());
    }
}
