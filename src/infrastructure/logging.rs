//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays free for captured text and JSON.
//! `RUST_LOG` wins over everything else; otherwise the configured level is
//! used, bumped to debug by `-v`.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable feeding `log_level` in the merged config
pub const LOG_ENV_VAR: &str = "SELGRAB_LOG";

/// Build the filter directive for the crate from the configured level.
pub fn filter_directive(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("warn,selgrab={}", level)
}

/// Resolve the effective filter, honouring `RUST_LOG`.
fn resolve_filter(level: &str, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(filter_directive(level, verbose))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive("warn", verbose)))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing(level: &str, verbose: bool) {
    let _ = fmt()
        .with_env_filter(resolve_filter(level, verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_forces_debug() {
        assert_eq!(filter_directive("warn", true), "warn,selgrab=debug");
        assert_eq!(filter_directive("info", false), "warn,selgrab=info");
    }

    #[test]
    fn known_levels_parse() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            assert!(EnvFilter::try_new(filter_directive(level, false)).is_ok());
        }
    }
}
