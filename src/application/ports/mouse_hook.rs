//! Mouse hook port interface

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::selection::DragEvent;

/// Mouse hook errors
#[derive(Debug, Clone, Error)]
pub enum MouseHookError {
    #[error("System-wide mouse hooks are not supported on this platform")]
    Unsupported,

    #[error("Failed to install mouse hook: {0}")]
    InstallFailed(String),

    #[error("A mouse hook is already installed")]
    AlreadyInstalled,
}

/// Channel end the hook pushes drag events into
pub type DragEventSender = mpsc::UnboundedSender<DragEvent>;

/// An installed hook. Dropping the handle uninstalls it.
pub struct HookHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl HookHandle {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Uninstall the hook now
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for HookHandle {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookHandle")
            .field("installed", &self.release.is_some())
            .finish()
    }
}

/// Port for system-wide mouse drag notifications
pub trait MouseHook: Send + Sync {
    /// Install the hook. Events flow into `events` until the handle is dropped.
    fn install(&self, events: DragEventSender) -> Result<HookHandle, MouseHookError>;
}

/// Blanket implementation for boxed hook types
impl MouseHook for Box<dyn MouseHook> {
    fn install(&self, events: DragEventSender) -> Result<HookHandle, MouseHookError> {
        self.as_ref().install(events)
    }
}
