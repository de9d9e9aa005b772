//! Keystroke infrastructure module
//!
//! Sends clipboard shortcuts through enigo, or nothing at all for dry runs.

mod enigo;
mod factory;
mod noop;

pub use enigo::EnigoKeystroke;
pub use factory::{create_keystroke, KeystrokeToolPreference, ParseKeystrokeToolError};
pub use noop::NoOpKeystroke;
