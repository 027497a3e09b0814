//! Chat API wire types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur talking to the chat API.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Connection, TLS or timeout failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx HTTP status (rate limiting, gateway errors).
    #[error("HTTP {status} from {method}: {body}")]
    Http {
        method: &'static str,
        status: u16,
        body: String,
    },

    /// The API answered `ok: false`.
    #[error("Slack API error in {method}: {error}")]
    Api { method: &'static str, error: String },

    /// Body was not the JSON we expected.
    #[error("Malformed response from {method}: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// No DM conversation exists with the user.
    #[error("No DM channel found for user {user_id}")]
    DmNotFound { user_id: String },
}

impl ChatError {
    /// The API's error code, when the failure was an `ok: false` answer.
    pub fn api_error(&self) -> Option<&str> {
        match self {
            ChatError::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// The success flag every Web API response carries.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenResponse {
    pub channel: ChannelRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub channels: Vec<ImChannel>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

impl ListResponse {
    pub fn next_cursor(&self) -> Option<&str> {
        self.response_metadata
            .as_ref()
            .map(|m| m.next_cursor.as_str())
            .filter(|c| !c.is_empty())
    }
}

/// A direct-message conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct ImChannel {
    pub id: String,
    /// The other member of the conversation.
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// A message in a conversation's history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Message timestamp; doubles as its id for threading.
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user: Option<String>,
    /// Set when a bot posted the message.
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl Message {
    pub fn is_from_bot(&self) -> bool {
        self.bot_id.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostResponse {
    #[serde(default)]
    pub ts: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenRequest<'a> {
    pub users: &'a str,
}

/// Filters for `conversations.history`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HistoryQuery {
    /// Maximum number of messages, newest first.
    pub limit: Option<u32>,
    /// Only messages after this Unix timestamp (seconds).
    pub oldest: Option<f64>,
}

impl HistoryQuery {
    pub fn latest() -> Self {
        Self {
            limit: Some(1),
            oldest: None,
        }
    }

    pub fn since(oldest: f64) -> Self {
        Self {
            limit: None,
            oldest: Some(oldest),
        }
    }
}
