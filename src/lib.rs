//! selgrab - capture the user's text selection through the clipboard
//!
//! Grabs whatever text is selected in the focused application by sending a
//! copy shortcut and watching the clipboard, then puts the previous
//! clipboard contents back exactly as they were.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Snapshots, formats, text decoding, the capture state machine, drag tracking
//! - **Application**: Use cases (capture, backup, watcher) and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (Win32 clipboard, enigo, mouse hook, config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
