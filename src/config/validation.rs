//! Configuration validation.
//!
//! # Responsibilities
//! - Check that every secret a job needs is present
//! - Validate value ranges (attempts > 0, window > 0, lengths > 0)
//! - Check that base URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Requirements depend on the job: chat-only jobs need no generation key

use thiserror::Error;
use url::Url;

use crate::config::schema::CourierConfig;
use crate::config::{GEMINI_API_KEY_ENV, SLACK_TOKEN_ENV, SLACK_USER_ID_ENV};
use crate::resilience::{Credential, CredentialSet};

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("environment variable {0} is not set")]
    MissingVariable(&'static str),

    #[error("{field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// What a job needs from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Requirements {
    /// The job calls the generation API.
    pub generation: bool,
}

/// Secrets resolved from a validated configuration.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub slack_token: String,
    pub user_id: String,
    /// Present when the job needs the generation API.
    pub generation: Option<CredentialSet>,
}

/// Validate `config` for a job with the given requirements.
pub fn validate_config(
    config: &CourierConfig,
    requirements: Requirements,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if is_blank(&config.slack.token) {
        errors.push(ValidationError::MissingVariable(SLACK_TOKEN_ENV));
    }
    if is_blank(&config.slack.user_id) {
        errors.push(ValidationError::MissingVariable(SLACK_USER_ID_ENV));
    }
    if requirements.generation && is_blank(&config.gemini.api_key) {
        errors.push(ValidationError::MissingVariable(GEMINI_API_KEY_ENV));
    }

    check_url("slack.base_url", &config.slack.base_url, &mut errors);
    if requirements.generation {
        check_url("gemini.base_url", &config.gemini.base_url, &mut errors);
        if config.gemini.model.trim().is_empty() {
            errors.push(invalid("gemini.model", "must not be empty"));
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(invalid("retries.max_attempts", "must be at least 1"));
    }
    if config.reply.window_secs == 0 {
        errors.push(invalid("reply.window_secs", "must be greater than 0"));
    }
    if config.summarize.window_secs == 0 {
        errors.push(invalid("summarize.window_secs", "must be greater than 0"));
    }
    if config.text.max_chars == 0 {
        errors.push(invalid("text.max_chars", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate, then pull the secrets out of `config`.
pub fn resolve_secrets(
    config: &CourierConfig,
    requirements: Requirements,
) -> Result<Secrets, Vec<ValidationError>> {
    validate_config(config, requirements)?;

    let generation = match non_blank(&config.gemini.api_key) {
        Some(primary) if requirements.generation => {
            let secondary = non_blank(&config.gemini.secondary_api_key).map(Credential::new);
            let creds = CredentialSet::new(Credential::new(primary)).with_secondary(secondary);
            tracing::info!(
                secondary_configured = creds.has_secondary(),
                "Generation credentials loaded"
            );
            Some(creds)
        }
        _ => None,
    };

    Ok(Secrets {
        slack_token: non_blank(&config.slack.token).unwrap_or_default().to_string(),
        user_id: non_blank(&config.slack.user_id).unwrap_or_default().to_string(),
        generation,
    })
}

fn is_blank(value: &Option<String>) -> bool {
    non_blank(value).is_none()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if let Err(e) = Url::parse(value) {
        errors.push(invalid(field, format!("invalid URL '{}': {}", value, e)));
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        message: message.into(),
    }
}
