//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::application::CaptureOutcome;
use crate::domain::capture::CaptureResult;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print a line above the spinner, or to stdout when none is running
    pub fn output_above_spinner(&self, text: &str) {
        match self.spinner {
            Some(ref spinner) => spinner.suspend(|| self.output(text)),
            None => self.output(text),
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Output a value as pretty JSON on stdout
    pub fn output_json<T: Serialize>(&self, value: &T) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string_pretty(value)?;
        self.output(&json);
        Ok(())
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// One-line description of a capture for stderr
    pub fn describe_outcome(&self, outcome: &CaptureOutcome) -> String {
        let mut line = match &outcome.result {
            CaptureResult::CapturedText(text) => {
                format!("Captured {} characters", text.chars().count())
            }
            CaptureResult::NoChangeDetected => "No new selection".to_string(),
            CaptureResult::TimedOut => "Timed out waiting for the selection".to_string(),
            CaptureResult::Failed => "Capture failed".to_string(),
        };
        if let Some(reason) = outcome.interruption {
            line.push_str(&format!(" ({})", reason));
        }
        line.push_str(&format!(" in {}ms", outcome.elapsed_ms));
        line
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::Interruption;

    fn outcome(result: CaptureResult) -> CaptureOutcome {
        CaptureOutcome {
            text: result.text().map(str::to_string),
            result,
            interruption: None,
            backup: None,
            restore: None,
            elapsed_ms: 42,
        }
    }

    #[test]
    fn describes_captured_text() {
        let presenter = Presenter::new();
        let line = presenter.describe_outcome(&outcome(CaptureResult::CapturedText("héllo".into())));
        assert_eq!(line, "Captured 5 characters in 42ms");
    }

    #[test]
    fn describes_interruption() {
        let presenter = Presenter::new();
        let mut timed_out = outcome(CaptureResult::TimedOut);
        timed_out.interruption = Some(Interruption::Cancelled);
        let line = presenter.describe_outcome(&timed_out);
        assert!(line.starts_with("Timed out"));
        assert!(line.contains(&Interruption::Cancelled.to_string()));
    }
}
