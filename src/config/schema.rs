//! Configuration schema definitions.
//!
//! Every section has defaults, so an empty file (or no file at all) is a
//! valid configuration. Secrets normally arrive through the environment and
//! are merged in by the loader.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::{DelayStrategy, RetryPolicy};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CourierConfig {
    /// Chat API settings.
    pub slack: SlackConfig,

    /// Generation API settings.
    pub gemini: GeminiConfig,

    /// Retry policy for generation calls.
    pub retries: RetryConfig,

    /// HTTP timeouts.
    pub timeouts: TimeoutConfig,

    /// Threaded auto-reply settings.
    pub reply: ReplyConfig,

    /// Conversation summary settings.
    pub summarize: SummarizeConfig,

    /// Prompts, placeholders and message templates.
    pub text: TextConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Chat API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Web API base URL.
    pub base_url: String,

    /// Bot token. Overridden by `SLACK_TOKEN`.
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// DM target user. Overridden by `SLACK_USER_ID`.
    pub user_id: Option<String>,
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("base_url", &self.base_url)
            .field("token", &redacted(&self.token))
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            base_url: "https://slack.com/api".to_string(),
            token: None,
            user_id: None,
        }
    }
}

/// Generation API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,

    pub api_version: String,

    /// Model id, e.g. "gemini-1.5-pro".
    pub model: String,

    /// Primary key. Overridden by `GEMINI_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Fallback key. Overridden by `GEMINI_API_KEY_SECONDARY`.
    #[serde(skip_serializing)]
    pub secondary_api_key: Option<String>,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("api_key", &redacted(&self.api_key))
            .field("secondary_api_key", &redacted(&self.secondary_api_key))
            .finish()
    }
}

/// Shows whether a secret is set without showing it.
fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_version: "v1beta".to_string(),
            model: "gemini-1.5-pro".to_string(),
            api_key: None,
            secondary_api_key: None,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds.
    pub delay_ms: u64,

    /// "fixed" or "exponential".
    pub strategy: DelayStrategy,

    /// Cap for exponential delays in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 2000,
            strategy: DelayStrategy::Fixed,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.delay_ms),
            strategy: self.strategy,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

/// Timeout configuration for outgoing HTTP calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Whole request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Auto-reply configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// How far back to look for messages to answer, in seconds.
    pub window_secs: u64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self { window_secs: 300 }
    }
}

/// Conversation summary configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizeConfig {
    /// How far back to collect messages, in seconds.
    pub window_secs: u64,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self { window_secs: 5 * 60 * 60 }
    }
}

/// Prompts, placeholders and templates.
///
/// Templates use `{name}` markers: `{excerpt}`, `{message}`, `{messages}`,
/// `{text}`, `{now}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TextConfig {
    /// History prompt when the channel has no previous message.
    pub history_topic_prompt: String,

    /// History prompt built around an excerpt of the previous message.
    pub history_extend_prompt: String,

    /// Substituted when the history generation comes back empty.
    pub history_placeholder: String,

    /// Header of a history post; `{now}` and `{text}`.
    pub history_template: String,

    /// Continuation prompt; `{message}`.
    pub continue_prompt: String,

    /// Stand-in for the previous message when the channel is empty.
    pub continue_seed: String,

    /// Substituted when the continuation comes back empty.
    pub continue_placeholder: String,

    /// Continuation post; `{text}`.
    pub continue_template: String,

    /// Threaded reply; `{text}` is the message being answered.
    pub reply_template: String,

    /// Announcement; `{now}`.
    pub announce_template: String,

    /// Summary prompt; `{messages}` is the window's texts, one per line.
    pub summarize_prompt: String,

    /// Posted as the summary when the window holds no messages.
    pub summarize_empty: String,

    /// Substituted when the summary comes back empty.
    pub summarize_placeholder: String,

    /// Summary post; `{text}`.
    pub summarize_template: String,

    /// Generated history text is cut to this many characters.
    pub max_chars: usize,

    /// Characters of the previous message quoted in the extend prompt.
    pub excerpt_chars: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            history_topic_prompt: "人工知能の歴史について、簡潔に説明してください。".to_string(),
            history_extend_prompt:
                "前回の投稿『{excerpt}』を基に、人工知能の歴史を拡張したコメントを生成してください。"
                    .to_string(),
            history_placeholder: "AIの考察を生成できませんでした。".to_string(),
            history_template: "📢 {now} のAI投稿:\n{text}".to_string(),
            continue_prompt: "以下の文章を基に話を広げた新しい内容を生成してください:\n{message}"
                .to_string(),
            continue_seed: "人工知能の歴史について詳しく説明してください。".to_string(),
            continue_placeholder: "新しい内容を生成できませんでした。".to_string(),
            continue_template: "📢 AIの投稿 {text}".to_string(),
            reply_template: "返信: {text} に対するボットからの返信です！".to_string(),
            announce_template: "📢 {now} のお知らせ: これは GitHub Actions によるテスト投稿です！"
                .to_string(),
            summarize_prompt: "以下のメッセージを要約してください:\n\n{messages}".to_string(),
            summarize_empty: "直近5時間のメッセージはありませんでした。".to_string(),
            summarize_placeholder: "要約に失敗しました。".to_string(),
            summarize_template: "📝 要約結果:\n\n{text}".to_string(),
            max_chars: 140,
            excerpt_chars: 50,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
