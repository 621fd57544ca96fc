//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PlannerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the openrouteservice key.
pub const ORS_API_KEY_ENV: &str = "ORS_API_KEY";

/// Environment variables checked, in order, for the places key.
pub const PLACES_API_KEY_ENVS: [&str; 2] = ["PLACES_API_KEY", "GOOGLE_PLACES_API_KEY"];

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PlannerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<PlannerConfig, ConfigError> {
    let config: PlannerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load from `path` if it exists, otherwise start from defaults; then apply
/// environment overrides.
pub fn load_or_default(path: &Path) -> Result<PlannerConfig, ConfigError> {
    let mut config = if path.exists() {
        load_config(path)?
    } else {
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        PlannerConfig::default()
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Let API keys from the environment replace file values.
pub fn apply_env_overrides<F>(config: &mut PlannerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(ORS_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
        config.providers.ors_api_key = Some(key);
    }
    if let Some(key) = PLACES_API_KEY_ENVS
        .iter()
        .find_map(|name| lookup(name).filter(|k| !k.trim().is_empty()))
    {
        config.providers.places_api_key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_invalid() {
        let err = parse_config("[limits]\nmax_stops = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("limits.max_stops"));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[timeouts\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PlannerConfig::default();
        config.providers.ors_api_key = Some("from-file".into());

        apply_env_overrides(&mut config, |name| match name {
            "ORS_API_KEY" => Some("from-env".into()),
            "GOOGLE_PLACES_API_KEY" => Some("google".into()),
            _ => None,
        });

        assert_eq!(config.providers.ors_api_key.as_deref(), Some("from-env"));
        assert_eq!(config.providers.places_api_key.as_deref(), Some("google"));
    }

    #[test]
    fn test_blank_env_does_not_override() {
        let mut config = PlannerConfig::default();
        config.providers.ors_api_key = Some("from-file".into());
        apply_env_overrides(&mut config, |_| Some(" ".into()));
        assert_eq!(config.providers.ors_api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_or_default(Path::new("definitely-missing-planner.toml")).unwrap();
        assert_eq!(config.limits.max_stops, 25);
    }
}
