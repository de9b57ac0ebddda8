//! Diagnostic logging.
//!
//! Runner-facing messages go through [`crate::actions::info`] on stdout.
//! `tracing` output is for diagnosing the action itself and goes to stderr.
//! The filter comes from `SETUP_ZIG_LOG`, then `RUST_LOG`; with neither set
//! it is `info`, or `debug` when the runner has step debugging enabled.

use tracing_subscriber::EnvFilter;

/// Filter variable specific to this action.
pub const LOG_ENV: &str = "SETUP_ZIG_LOG";

/// Set to `1` by the runner when step debug logging is enabled.
const RUNNER_DEBUG_ENV: &str = "RUNNER_DEBUG";

/// Returns the filter directive to use when no filter variable is set.
fn default_directive(runner_debug: Option<&str>) -> &'static str {
    if runner_debug == Some("1") {
        "debug"
    } else {
        "info"
    }
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            let runner_debug = std::env::var(RUNNER_DEBUG_ENV).ok();
            EnvFilter::new(default_directive(runner_debug.as_deref()))
        });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_debug_raises_default_level() {
        assert_eq!(default_directive(Some("1")), "debug");
        assert_eq!(default_directive(Some("0")), "info");
        assert_eq!(default_directive(None), "info");
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
