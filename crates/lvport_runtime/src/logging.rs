//! Log output setup for hosts that embed the runtime

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable read for the filter directives
pub const LOG_ENV: &str = "LVPORT_LOG";

/// Build the filter from `LVPORT_LOG`, falling back to `default_level`
pub fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install a formatting subscriber
///
/// Returns `false` when a global subscriber was already set, so calling this
/// from several drivers is harmless.
pub fn init(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter(default_level))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init("debug");
        assert!(!init("info"));
    }

    #[test]
    fn test_filter_accepts_directives() {
        let f = filter("lvport_runtime=trace,warn");
        assert!(f.to_string().contains("warn"));
    }
}
