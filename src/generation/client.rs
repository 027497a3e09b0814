//! Generation API client.
//!
//! # Responsibilities
//! - Submit a text prompt to `models/{model}:generateContent`
//! - Authenticate with whichever credential the caller passes in
//! - Map error bodies and 429s to `GenerationError`

use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};

use crate::config::{GeminiConfig, TimeoutConfig};
use crate::generation::types::{
    ErrorResponse, GenerateContentRequest, GenerateContentResponse, GenerationError,
    GenerationResult,
};
use crate::resilience::Credential;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini REST client. Holds no credential of its own.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, timeouts: &TimeoutConfig) -> GenerationResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()?;

        Ok(Self::with_http_client(http, config))
    }

    pub fn with_http_client(http: reqwest::Client, config: &GeminiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, self.api_version, self.model
        )
    }

    /// Generate text for `prompt` using `credential`.
    ///
    /// An answer with no candidates or no text yields an empty string, not
    /// an error.
    pub async fn generate(&self, credential: &Credential, prompt: &str) -> GenerationResult<String> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Generating text");

        let key = HeaderValue::from_str(credential.expose()).map_err(|_| GenerationError::Api {
            status: 401,
            message: "API key contains characters not allowed in a header".to_string(),
        })?;

        let response = self
            .http
            .post(self.generate_url())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::error_from(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        if let Some(reason) = parsed
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.finish_reason.as_deref())
        {
            tracing::debug!(finish_reason = %reason, "Generation finished");
        }
        Ok(parsed.text())
    }

    fn error_from(status: u16, body: &str) -> GenerationError {
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(err) => match err.error.status {
                Some(code) => format!("{}: {}", code, err.error.message),
                None => err.error.message,
            },
            Err(_) => body.to_string(),
        };

        if status == 429 {
            GenerationError::RateLimited { message }
        } else {
            GenerationError::Api { status, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_has_no_key() {
        let client = GeminiClient::with_http_client(reqwest::Client::new(), &GeminiConfig::default());
        assert_eq!(
            client.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_error_mapping() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = GeminiClient::error_from(429, body);
        assert!(matches!(err, GenerationError::RateLimited { .. }));
        assert_eq!(
            err.to_string(),
            "Rate limited: RESOURCE_EXHAUSTED: Resource has been exhausted"
        );

        let err = GeminiClient::error_from(502, "<html>bad gateway</html>");
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("bad gateway"));
    }
}
