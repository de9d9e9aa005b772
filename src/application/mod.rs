//! Application layer - Use cases and port interfaces
//!
//! Contains the core clipboard operations and trait definitions
//! for external system interactions.

pub mod accessor;
pub mod backup;
pub mod ports;
pub mod selection;
pub mod watcher;

// Re-export use cases
pub use accessor::{ClipboardAccessor, ClipboardSession};
pub use backup::BackupStore;
pub use selection::{CaptureError, CaptureOutcome, SelectionCaptureUseCase, PASTE_DELAY};
pub use watcher::SelectionWatcher;
