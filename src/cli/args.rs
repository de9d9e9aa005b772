//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// selgrab - grab the selected text of the focused application
#[derive(Parser, Debug)]
#[command(name = "selgrab")]
#[command(version)]
#[command(about = "Capture the current text selection through the clipboard")]
#[command(long_about = None)]
pub struct Cli {
    /// How long to wait for the selection (e.g., 500ms, 2s, 1m30s)
    #[arg(short = 't', long, value_name = "TIME", env = "SELGRAB_TIMEOUT", global = true)]
    pub timeout: Option<String>,

    /// Print a JSON report instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Keystroke tool to use (enigo, none)
    #[arg(long, value_name = "TOOL", global = true)]
    pub keystroke_tool: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the clipboard text
    Get,
    /// Replace the clipboard contents with text
    Set {
        /// Text to place on the clipboard
        text: String,
    },
    /// Paste text into the focused window, keeping the clipboard intact
    Paste {
        /// Text to paste
        text: String,
    },
    /// Print every selection made with the mouse until Ctrl+C
    Watch,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "timeout",
    "poll_interval",
    "settle_delay",
    "max_format_size",
    "max_total_size",
    "open_retries",
    "open_retry_interval",
    "keystroke_tool",
    "log_level",
];

/// Valid keystroke tool values
pub const VALID_KEYSTROKE_TOOLS: &[&str] = &["enigo", "none"];

/// Valid log levels
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace", "off"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
