//! Logging setup.
//!
//! The crate itself only emits `tracing` events and `metrics` values;
//! hosts choose the subscriber and exporter. This module offers a small
//! fmt-subscriber initializer for embedders that do not bring their own.

use tracing_subscriber::EnvFilter;

/// Logging configuration.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `KNOWSYNC_LOG` | str | `knowsync=info` | `tracing` env-filter directive |
/// | `KNOWSYNC_LOG_FORMAT` | str | `text` | `text` or `json` |
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Env-filter directive string.
    pub filter: String,
    /// Emit JSON-structured lines instead of human-readable text.
    pub json: bool,
}

impl LoggingConfig {
    /// Creates a logging configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let filter =
            std::env::var("KNOWSYNC_LOG").unwrap_or_else(|_| "knowsync=info".to_string());
        let json = std::env::var("KNOWSYNC_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        Self { filter, json }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "knowsync=info".to_string(),
            json: false,
        }
    }
}

/// Installs a global fmt subscriber for the given configuration.
///
/// Returns `false` if a global subscriber was already set (e.g. by the
/// embedding application or a previous call), in which case this call is a
/// no-op.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_new(&config.filter)
        .unwrap_or_else(|_| EnvFilter::new("knowsync=info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.filter, "knowsync=info");
        assert!(!config.json);
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        // Whichever call wins the race, the second is always a no-op
        let first = init_logging(&config);
        let second = init_logging(&config);
        assert!(!(first && second));
    }
}
