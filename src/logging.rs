//! Diagnostic logging.
//!
//! Diagnostics go to stderr through `tracing`, filtered by the
//! `LOANCHAT_LOG` environment variable (same syntax as `RUST_LOG`). The
//! conversation transcript log lives in [`crate::utils::logging`].

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "LOANCHAT_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

// HTTP client internals are noisy at debug level.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

pub fn env_filter(directive: Option<&str>) -> EnvFilter {
    let directive = directive
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE);
    let mut filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    for target in QUIET_TARGETS {
        if let Ok(parsed) = target.parse() {
            filter = filter.add_directive(parsed);
        }
    }
    filter
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init() {
    let directive = std::env::var(LOG_ENV_VAR).ok();
    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directive.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_invalid_directives_fall_back_to_warn() {
        assert_eq!(env_filter(None).max_level_hint(), env_filter(Some("warn")).max_level_hint());
        assert_eq!(env_filter(Some("  ")).max_level_hint(), env_filter(Some("warn")).max_level_hint());
        assert_eq!(
            env_filter(Some("loanchat=loudest")).max_level_hint(),
            env_filter(Some("warn")).max_level_hint()
        );
    }

    #[test]
    fn explicit_directive_raises_verbosity() {
        let debug = env_filter(Some("debug")).max_level_hint();
        let warn = env_filter(None).max_level_hint();
        assert!(debug > warn);
    }
}
