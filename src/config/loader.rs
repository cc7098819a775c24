//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::DispatchConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<DispatchConfig, ConfigError> {
    let config: DispatchConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
///
/// Relative paths inside the file (routes file, module roots) are resolved
/// against the file's directory.
pub fn load_config(path: &Path) -> Result<DispatchConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config = parse_config(&content)?;

    if let Some(base) = path.parent() {
        if config.routes.path.is_relative() {
            config.routes.path = base.join(&config.routes.path);
        }
        for root in config.modules.values_mut() {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route-dispatch.toml");
        fs::write(
            &path,
            "[routes]\npath = \"conf/routes\"\n[modules]\nadmin = \"/abs/admin\"\nblog = \"modules/blog\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.routes.path, dir.path().join("conf/routes"));
        assert_eq!(config.modules["admin"], Path::new("/abs/admin"));
        assert_eq!(config.modules["blog"], dir.path().join("modules/blog"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/route-dispatch.toml")),
            Err(ConfigError::Io(_))
        ));
        assert!(matches!(parse_config("[routes"), Err(ConfigError::Parse(_))));

        let err = parse_config("[routes]\npoll_interval_secs = 0\n").unwrap_err();
        assert!(err.to_string().starts_with("Validation failed: routes.poll_interval_secs"));
    }
}
