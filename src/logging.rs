//! Log subscriber setup.
//!
//! The library itself only emits `tracing` events: one `remote_call` span per
//! gateway call (with a request id and the remote method name), a `warn` event
//! for transport faults and `debug` events for result codes. Applications
//! that do not install their own subscriber can call [`init_logging`].

use tracing::Level;

use crate::config::LoggingConfig;

/// Install a `fmt` subscriber at the configured level.
///
/// Returns `false` when logging is disabled or a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    if !config.enabled {
        return false;
    }

    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_installs_nothing() {
        assert!(!init_logging(&LoggingConfig::default()));
    }
}
