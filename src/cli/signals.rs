//! Ctrl+C handling
//!
//! Ctrl+C cancels a shared token instead of killing the process, so an
//! in-flight capture still restores the clipboard before exiting.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Shutdown signal backed by a cancellation token
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Token cancelled on Ctrl+C
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until shutdown is requested
    pub async fn wait(&self) {
        self.token.cancelled().await
    }

    /// Start listening for Ctrl+C
    pub fn setup(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    debug!("Received Ctrl+C");
                    token.cancel();
                }
                Err(e) => warn!(error = %e, "Ctrl+C listener failed"),
            }
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_signal_default_is_false() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
    }

    #[tokio::test]
    async fn cancelled_token_ends_wait() {
        let signal = ShutdownSignal::new();
        signal.token().cancel();
        signal.wait().await;
        assert!(signal.is_shutdown());
    }
}
