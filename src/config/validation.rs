//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (poll interval > 0, known log level)
//! - Reject names the route grammar could never produce
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatchConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::DispatchConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.routes.path.as_os_str().is_empty() {
        errors.push(ValidationError::new("routes.path", "must not be empty"));
    }
    if config.routes.poll_interval_secs == 0 {
        errors.push(ValidationError::new(
            "routes.poll_interval_secs",
            "must be greater than zero",
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    for name in config.modules.keys() {
        if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
            errors.push(ValidationError::new(
                "modules",
                format!("invalid module name '{}'", name),
            ));
        }
    }

    for (namespace, members) in &config.actions {
        for name in std::iter::once(namespace).chain(members) {
            if name.is_empty() || name.contains(['.', ':']) {
                errors.push(ValidationError::new(
                    format!("actions.{}", namespace),
                    format!("invalid action name '{}'", name),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DispatchConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DispatchConfig::default();
        config.routes.path = PathBuf::new();
        config.routes.poll_interval_secs = 0;
        config.observability.log_level = "loud".into();
        config.modules.insert("bad name".into(), PathBuf::from("x"));
        config
            .actions
            .insert("App".into(), vec!["Index".into(), "a.b".into(), "c:d".into()]);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "routes.path",
                "routes.poll_interval_secs",
                "observability.log_level",
                "modules",
                "actions.App",
                "actions.App",
            ]
        );
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = DispatchConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
