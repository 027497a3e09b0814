//! Chat API client.
//!
//! # Responsibilities
//! - Authenticate every call with the bot token (`Authorization: Bearer`)
//! - Map `ok: false` answers and HTTP failures to `ChatError`
//! - Expose the handful of Web API methods the jobs use

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::chat::types::{
    ChatError, ChatResult, Envelope, HistoryQuery, HistoryResponse, ListResponse, Message,
    OpenRequest, OpenResponse, PostMessageRequest, PostResponse,
};
use crate::config::{SlackConfig, TimeoutConfig};

/// Page size for `conversations.list`.
const LIST_PAGE_LIMIT: &str = "200";

/// Slack Web API client bound to one bot token.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    /// Build a client with its own HTTP connection pool.
    pub fn new(config: &SlackConfig, timeouts: &TimeoutConfig, token: &str) -> ChatResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()?;

        Ok(Self::with_http_client(http, &config.base_url, token))
    }

    /// Build a client on top of an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    fn auth_headers(&self) -> ChatResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|_| {
            ChatError::Api {
                method: "auth",
                error: "invalid_auth_token_characters".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &'static str,
        query: &[(&str, String)],
    ) -> ChatResult<T> {
        let response = self
            .http
            .get(self.endpoint(method))
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await?;
        Self::decode(method, response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &'static str,
        body: &B,
    ) -> ChatResult<T> {
        let response = self
            .http
            .post(self.endpoint(method))
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;
        Self::decode(method, response).await
    }

    async fn decode<T: DeserializeOwned>(
        method: &'static str,
        response: reqwest::Response,
    ) -> ChatResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::Http {
                method,
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|source| ChatError::Decode { method, source })?;
        if !envelope.ok {
            return Err(ChatError::Api {
                method,
                error: envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }

        serde_json::from_str(&text).map_err(|source| ChatError::Decode { method, source })
    }

    /// Open (or find) the DM conversation with `user_id` and return its id.
    pub async fn open_dm(&self, user_id: &str) -> ChatResult<String> {
        let response: OpenResponse = self
            .post("conversations.open", &OpenRequest { users: user_id })
            .await?;
        tracing::debug!(user = %user_id, channel = %response.channel.id, "DM channel opened");
        Ok(response.channel.id)
    }

    /// Look up an existing DM conversation with `user_id`, paging through
    /// the bot's DM list.
    pub async fn find_dm(&self, user_id: &str) -> ChatResult<String> {
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("types", "im".to_string()), ("limit", LIST_PAGE_LIMIT.to_string())];
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }

            let page: ListResponse = self.get("conversations.list", &query).await?;
            if let Some(channel) = page
                .channels
                .iter()
                .find(|c| c.user.as_deref() == Some(user_id))
            {
                tracing::debug!(user = %user_id, channel = %channel.id, "DM channel found");
                return Ok(channel.id.clone());
            }

            match page.next_cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }

        Err(ChatError::DmNotFound {
            user_id: user_id.to_string(),
        })
    }

    /// Fetch messages from a conversation, newest first.
    pub async fn history(&self, channel: &str, query: &HistoryQuery) -> ChatResult<Vec<Message>> {
        let mut params = vec![("channel", channel.to_string())];
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(oldest) = query.oldest {
            params.push(("oldest", format!("{:.6}", oldest)));
        }

        let response: HistoryResponse = self.get("conversations.history", &params).await?;
        tracing::debug!(channel = %channel, count = response.messages.len(), "History fetched");
        Ok(response.messages)
    }

    /// Text of the newest message in `channel`, if there is one.
    pub async fn latest_text(&self, channel: &str) -> ChatResult<Option<String>> {
        let messages = self.history(channel, &HistoryQuery::latest()).await?;
        Ok(messages.into_iter().next().map(|m| m.text))
    }

    /// Post `text` to `channel`, threaded under `thread_ts` when given.
    /// Returns the new message's timestamp.
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> ChatResult<String> {
        let request = PostMessageRequest {
            channel,
            text,
            thread_ts,
        };
        let response: PostResponse = self.post("chat.postMessage", &request).await?;
        tracing::info!(
            channel = %channel,
            threaded = thread_ts.is_some(),
            ts = %response.ts,
            "Message posted"
        );
        Ok(response.ts)
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
