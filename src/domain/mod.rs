//! Domain layer - Core business logic
//!
//! Contains value objects, state machines, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod selection;
pub mod timing;

// Re-export common types
pub use capture::{CapturePhase, CaptureResult, CaptureSettings, Interruption, SelectionCaptureAttempt};
pub use clipboard::{ByteSize, ClipboardFormat, ClipboardSnapshot, SnapshotLimits};
pub use config::AppConfig;
pub use error::*;
pub use selection::{DragEvent, DragTracker};
pub use timing::Duration;
