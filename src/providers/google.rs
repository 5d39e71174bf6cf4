use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use log::{debug, warn};

use crate::app_config::BackendConfig;
use crate::errors::BackendError;
use crate::providers::TranslationBackend;

/// Upper bound for a single retry delay
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// Google Cloud Translation (v2) client
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, without the `/language/translate/v2` path
    endpoint: String,
    /// Additional attempts for retryable failures
    retry_count: u32,
    /// Base backoff, doubled on each retry
    retry_backoff: Duration,
}

/// Translation request body
#[derive(Debug, Serialize)]
pub struct GoogleTranslateRequest<'a> {
    /// Strings to translate, in order
    q: &'a [String],

    /// Target language code
    target: &'a str,

    /// Input format; `text` keeps the service from treating input as HTML
    format: &'static str,
}

/// Translation response body
#[derive(Debug, Deserialize)]
pub struct GoogleTranslateResponse {
    /// Response payload
    pub data: GoogleTranslateData,
}

/// Payload of a translation response
#[derive(Debug, Deserialize)]
pub struct GoogleTranslateData {
    /// One entry per requested string, in request order
    pub translations: Vec<GoogleTranslation>,
}

/// Individual translation in a response
#[derive(Debug, Deserialize)]
pub struct GoogleTranslation {
    /// The translated text
    #[serde(rename = "translatedText")]
    pub translated_text: String,

    /// Source language detected by the service
    #[serde(rename = "detectedSourceLanguage", default)]
    pub detected_source_language: Option<String>,
}

impl GoogleTranslate {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            retry_count: 0,
            retry_backoff: Duration::from_millis(0),
        }
    }

    /// Create a client from the backend section of the configuration
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
        .with_retries(config.retry_count, Duration::from_millis(config.retry_backoff_ms))
    }

    /// Retry retryable failures `retry_count` more times with exponential backoff
    pub fn with_retries(mut self, retry_count: u32, retry_backoff: Duration) -> Self {
        self.retry_count = retry_count;
        self.retry_backoff = retry_backoff;
        self
    }

    /// Delay before retry number `attempt + 1`: base backoff doubled per attempt, capped
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .checked_mul(2u32.saturating_pow(attempt))
            .map_or(MAX_RETRY_BACKOFF, |delay| delay.min(MAX_RETRY_BACKOFF))
    }

    /// Full URL of the translate method
    pub fn api_url(&self) -> String {
        format!("{}/language/translate/v2", self.endpoint.trim_end_matches('/'))
    }

    /// Decode a response body into translations, preserving order
    pub fn parse_response(body: &str, target_language: &str) -> Result<Vec<String>, BackendError> {
        let response: GoogleTranslateResponse =
            serde_json::from_str(body).map_err(|e| BackendError::ParseError {
                language: target_language.to_string(),
                message: e.to_string(),
            })?;

        Ok(response
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }

    /// One request without retries
    async fn send(&self, payload: &[String], target_language: &str) -> Result<Vec<String>, BackendError> {
        let request = GoogleTranslateRequest {
            q: payload,
            target: target_language,
            format: "text",
        };

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed {
                language: target_language.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| BackendError::RequestFailed {
            language: target_language.to_string(),
            message: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(BackendError::ApiError {
                language: target_language.to_string(),
                status_code: status.as_u16(),
                message: body,
            });
        }

        Self::parse_response(&body, target_language)
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslate {
    async fn translate(
        &self,
        payload: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, BackendError> {
        let mut attempt = 0;

        loop {
            match self.send(payload, target_language).await {
                Ok(translations) => {
                    debug!(
                        "Translated {} strings to [{}] on attempt {}",
                        payload.len(),
                        target_language,
                        attempt + 1
                    );
                    return Ok(translations);
                }
                Err(e) if e.is_retryable() && attempt < self.retry_count => {
                    let delay = self.backoff_delay(attempt);
                    warn!("{} (retrying in {:?})", e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
