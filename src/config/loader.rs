//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::CourierConfig;
use crate::config::validation::ValidationError;
use crate::config::{
    GEMINI_API_KEY_ENV, GEMINI_API_KEY_SECONDARY_ENV, SLACK_TOKEN_ENV, SLACK_USER_ID_ENV,
};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

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

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ConfigError::Validation(errors)
    }
}

/// Load configuration from an optional TOML file, then overlay the process
/// environment.
///
/// Validation is left to the caller, since what is required depends on the
/// job being run.
pub fn load_config(path: Option<&Path>) -> Result<CourierConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => CourierConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn parse_file(path: &Path) -> Result<CourierConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), "Configuration file parsed");
    Ok(config)
}

/// Overlay secrets from an environment lookup. Unset or empty variables leave
/// the file value untouched.
pub fn apply_env_overrides<F>(config: &mut CourierConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = get(SLACK_TOKEN_ENV) {
        config.slack.token = Some(token);
    }
    if let Some(user_id) = get(SLACK_USER_ID_ENV) {
        config.slack.user_id = Some(user_id);
    }
    if let Some(key) = get(GEMINI_API_KEY_ENV) {
        config.gemini.api_key = Some(key);
    }
    if let Some(key) = get(GEMINI_API_KEY_SECONDARY_ENV) {
        config.gemini.secondary_api_key = Some(key);
    }
}
