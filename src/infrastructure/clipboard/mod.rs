//! Clipboard infrastructure module
//!
//! Provides the Win32 clipboard on Windows and an in-memory clipboard
//! everywhere.

mod memory;
#[cfg(windows)]
mod win32;

pub use memory::{MemoryClipboard, MemoryStats};
#[cfg(windows)]
pub use win32::Win32Clipboard;

use crate::application::ports::{AccessError, ClipboardApi};

/// Create the system clipboard adapter for the current platform
pub fn system_clipboard() -> Result<Box<dyn ClipboardApi>, AccessError> {
    #[cfg(windows)]
    {
        Ok(Box::new(Win32Clipboard::new()))
    }

    #[cfg(not(windows))]
    {
        Err(AccessError::Unsupported)
    }
}
