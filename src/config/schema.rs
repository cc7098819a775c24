//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the dispatcher.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Routes file location and reload behavior.
    pub routes: RoutesConfig,

    /// Active modules: name → module root. A module's routes live at
    /// `<root>/conf/routes`.
    pub modules: BTreeMap<String, PathBuf>,

    /// Known actions: namespace → member names. Used to validate route
    /// targets when `routes.validate` is set.
    pub actions: BTreeMap<String, Vec<String>>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Routes file configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Path of the application routes file.
    pub path: PathBuf,

    /// Check every target against the declared actions.
    pub validate: bool,

    /// Rebuild the table when the routes files change.
    pub watch: bool,

    /// Poll interval for file watching backends that poll.
    pub poll_interval_secs: u64,
}

impl RoutesConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("conf/routes"),
            validate: true,
            watch: true,
            poll_interval_secs: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: DispatchConfig = toml::from_str("").unwrap();
        assert_eq!(config, DispatchConfig::default());
        assert_eq!(config.routes.path, PathBuf::from("conf/routes"));
        assert!(config.routes.validate);
        assert_eq!(config.routes.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_full_document() {
        let config: DispatchConfig = toml::from_str(
            r#"
            [routes]
            path = "app/conf/routes"
            watch = false

            [modules]
            testrunner = "modules/testrunner"

            [actions]
            Application = ["Index", "Show"]
            "#,
        )
        .unwrap();

        assert_eq!(config.routes.path, PathBuf::from("app/conf/routes"));
        assert!(!config.routes.watch);
        assert!(config.routes.validate);
        assert_eq!(config.modules["testrunner"], PathBuf::from("modules/testrunner"));
        assert_eq!(config.actions["Application"], vec!["Index", "Show"]);
    }
}
