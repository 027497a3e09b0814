//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize, overlay environment secrets)
//!     → validation.rs (per-job requirements, semantic checks)
//!     → CourierConfig + Secrets (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; secrets normally come only from the environment
//! - A missing required variable is fatal before any network call
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CourierConfig, GeminiConfig, LogFormat, ObservabilityConfig, ReplyConfig, RetryConfig,
    SlackConfig, SummarizeConfig, TextConfig, TimeoutConfig,
};
pub use validation::{resolve_secrets, validate_config, Requirements, Secrets, ValidationError};

/// Chat API bot token.
pub const SLACK_TOKEN_ENV: &str = "SLACK_TOKEN";

/// User whose DM channel the jobs read and write.
pub const SLACK_USER_ID_ENV: &str = "SLACK_USER_ID";

/// Primary generation API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Optional fallback generation API key.
pub const GEMINI_API_KEY_SECONDARY_ENV: &str = "GEMINI_API_KEY_SECONDARY";
