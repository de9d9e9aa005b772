//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod clipboard;
pub mod config;
pub mod keystroke;
pub mod mouse_hook;

// Re-export common types
pub use clipboard::{AccessError, ClipboardApi, MemoryHandle};
pub use config::{ConfigEdit, ConfigStore};
pub use keystroke::{Keystroke, KeystrokeError, Shortcut};
pub use mouse_hook::{DragEventSender, HookHandle, MouseHook, MouseHookError};
