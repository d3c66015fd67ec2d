//! Logging setup for the engine and its USB worker thread
//!
//! One global subscriber covers both sides of the channel bridge, so
//! transfer-level lines from the blocking worker interleave with the async
//! engine's in a single stream. `RUST_LOG` wins when set; otherwise the
//! caller's default directive applies.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directive applied when neither `RUST_LOG` nor a caller override exists
///
/// Container-level debug lines live under the engine's own targets; rusb is
/// kept at `warn` because its per-transfer chatter drowns them out.
pub const DEFAULT_DIRECTIVE: &str = "info,engine=debug,protocol=debug,rusb=warn";

/// Install the global tracing subscriber
///
/// `default_directive` is used when `RUST_LOG` is absent; pass
/// [`DEFAULT_DIRECTIVE`] unless the caller has its own filtering policy.
/// Installing twice in one process reports a configuration error instead of
/// panicking, so embedders that already own a subscriber can ignore it.
pub fn setup_logging(default_directive: &str) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| {
            crate::Error::Config(format!(
                "invalid log directive {:?}: {}",
                default_directive, e
            ))
        })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .map_err(|e| crate::Error::Config(format!("logging already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        assert!(EnvFilter::try_new(DEFAULT_DIRECTIVE).is_ok());
    }

    #[test]
    fn test_second_install_reports_config_error() {
        // The first call may itself collide with a subscriber installed
        // elsewhere in the process; either way the second call must report
        // an error, not panic
        let _ = setup_logging(DEFAULT_DIRECTIVE);
        let result = setup_logging(DEFAULT_DIRECTIVE);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }
}
