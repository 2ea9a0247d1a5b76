//! Console logging for the bookshelf binary
//!
//! Without `RUST_LOG`, our own crates and the HTTP request spans log at
//! `info` (or `debug` with `--debug`), while sqlx stays at `warn` so
//! per-statement logs don't drown the request log.
//!
//!   RUST_LOG=bookshelf_server=trace bookshelf    # Fine-grained log control

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Crates whose logs follow the configured level.
const SERVICE_TARGETS: [&str; 3] = ["bookshelf", "bookshelf_server", "tower_http"];

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Raise service logs to debug
    pub debug: bool,
}

impl TracingConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    pub fn default_directives(&self) -> String {
        let level = if self.debug { "debug" } else { "info" };
        let mut directives = vec!["warn".to_string()];
        directives.extend(SERVICE_TARGETS.iter().map(|target| format!("{target}={level}")));
        directives.push("sqlx=warn".to_string());
        directives.join(",")
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directives()))
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_target(config.debug) // Show targets in debug mode
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_scope_service_crates() {
        let directives = TracingConfig { debug: false }.default_directives();
        assert_eq!(
            directives,
            "warn,bookshelf=info,bookshelf_server=info,tower_http=info,sqlx=warn"
        );
    }

    #[test]
    fn debug_raises_only_service_crates() {
        let directives = TracingConfig { debug: true }.default_directives();
        assert!(directives.contains("bookshelf_server=debug"));
        assert!(directives.contains("tower_http=debug"));
        assert!(directives.starts_with("warn,"));
        assert!(directives.ends_with("sqlx=warn"));
    }

    #[test]
    fn directives_parse_as_filter() {
        let directives = TracingConfig::default().default_directives();
        assert!(EnvFilter::try_new(directives).is_ok());
    }

    #[test]
    fn second_init_is_an_error() {
        let config = TracingConfig::default();
        // The first call may already fail if another test installed a subscriber
        let result = init(&config).and_then(|_| init(&config));
        assert!(result.is_err());
    }
}
