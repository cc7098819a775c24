//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber
//! - Pick the filter from `RUST_LOG`, falling back to the configured level

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(level: &str) -> String {
    format!("route_dispatch={level}")
}

/// Install the stdout subscriber. Fails if one is already installed.
pub fn init_logging(level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter("debug"), "route_dispatch=debug");
        assert!(EnvFilter::try_new(default_filter("warn")).is_ok());
    }
}
