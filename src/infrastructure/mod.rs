//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces: the Win32 and
//! in-memory clipboards, keystroke injection, the mouse hook, config storage
//! and the tracing subscriber.

pub mod clipboard;
pub mod config;
pub mod keystroke;
pub mod logging;
pub mod mouse_hook;

// Re-export adapters
pub use clipboard::{system_clipboard, MemoryClipboard};
pub use config::XdgConfigStore;
pub use keystroke::{create_keystroke, EnigoKeystroke, KeystrokeToolPreference, NoOpKeystroke};
pub use logging::init_tracing;
pub use mouse_hook::{system_mouse_hook, ManualMouseHook, UnsupportedMouseHook};
