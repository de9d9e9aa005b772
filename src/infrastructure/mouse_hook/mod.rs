//! Mouse hook infrastructure module

mod manual;
#[cfg(windows)]
mod windows;

pub use manual::ManualMouseHook;
#[cfg(windows)]
pub use windows::WindowsMouseHook;

use crate::application::ports::{DragEventSender, HookHandle, MouseHook, MouseHookError};

/// Mouse hook for platforms without system-wide hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedMouseHook;

impl MouseHook for UnsupportedMouseHook {
    fn install(&self, _events: DragEventSender) -> Result<HookHandle, MouseHookError> {
        Err(MouseHookError::Unsupported)
    }
}

/// Create the system mouse hook for the current platform
pub fn system_mouse_hook() -> Box<dyn MouseHook> {
    #[cfg(windows)]
    {
        Box::new(WindowsMouseHook::new())
    }

    #[cfg(not(windows))]
    {
        Box::new(UnsupportedMouseHook)
    }
}
