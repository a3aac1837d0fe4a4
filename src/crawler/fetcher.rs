//! HTTP fetcher for the contest listing page
//!
//! This module provides the fetcher for the race calendar page with:
//! - Request timeout
//! - Automatic retry with exponential backoff on 429 and 5xx
//! - UTF-8 decoding with a Big5 fallback for legacy pages

use crate::config::SourceConfig;
use crate::utils::error::FetchError;
use encoding_rs::{BIG5, UTF_8};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client, Response,
};
use std::time::Duration;

/// Fetcher for the contest listing page
pub struct ContestFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Page URL
    url: String,

    /// User agent sent with every request
    user_agent: String,

    /// Maximum number of retry attempts for failed requests
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,
}

impl ContestFetcher {
    /// Create a fetcher for `url` with default settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for a malformed URL, or
    /// `FetchError::Http` if the HTTP client cannot be created
    pub fn new(url: &str) -> Result<Self, FetchError> {
        Self::with_config(url, 3, Duration::from_secs(30))
    }

    /// Create a fetcher with custom retry count and timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for a malformed URL, or
    /// `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(url: &str, max_retries: u32, timeout: Duration) -> Result<Self, FetchError> {
        url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        let client = Client::builder().timeout(timeout).gzip(true).build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            user_agent: format!("racecal/{}", env!("CARGO_PKG_VERSION")),
            max_retries,
            base_delay_ms: 1000,
        })
    }

    /// Create a fetcher from the `[source]` configuration section
    ///
    /// # Errors
    ///
    /// Same as [`with_config`](Self::with_config)
    pub fn from_config(config: &SourceConfig) -> Result<Self, FetchError> {
        let mut fetcher = Self::with_config(
            &config.url,
            config.max_retries,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        fetcher.user_agent = config.user_agent.clone();
        Ok(fetcher)
    }

    /// Override the backoff base delay (tests use a few milliseconds)
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// URL this fetcher requests
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the contest page with retry logic
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ServerError` for a non-retryable status,
    /// `FetchError::MaxRetriesExceeded` once every retry failed, or
    /// `FetchError::Decode` if the body cannot be decoded
    pub async fn fetch(&self) -> Result<String, FetchError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tracing::debug!(attempt, delay_ms = delay, "Retrying contest page fetch");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self
                .client
                .get(&self.url)
                .headers(self.build_headers())
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return self.decode_response(response).await;
                    } else if Self::should_retry(status.as_u16()) {
                        tracing::warn!(status = status.as_u16(), attempt, "Retryable status");
                        last_error = Some(FetchError::ServerError(status.as_u16()));
                    } else {
                        return Err(FetchError::ServerError(status.as_u16()));
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "Contest page request failed");
                    last_error = Some(if e.is_timeout() {
                        FetchError::Timeout
                    } else {
                        FetchError::Http(e)
                    });
                }
            }
        }

        if let Some(error) = last_error {
            tracing::error!(error = %error, retries = self.max_retries, "Giving up on contest page");
        }
        Err(FetchError::MaxRetriesExceeded)
    }

    /// Determine if a status code should trigger a retry
    ///
    /// Retry on 429, 500, 502, 503 and 504; everything else is final.
    pub(crate) fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await?;

        decode_bytes(&bytes, &content_type)
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(agent) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, agent);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-TW,zh;q=0.9,en;q=0.7"),
        );

        headers
    }
}

/// Decode a page body to a string
///
/// Tries, in order: the charset named in `Content-Type`, UTF-8, Big5, and
/// finally a `<meta charset>` declaration near the top of the document.
///
/// # Errors
///
/// Returns `FetchError::Decode` if no strategy decodes cleanly
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
    let content_type = content_type.to_lowercase();

    if content_type.contains("charset=big5") {
        return decode_big5(bytes);
    }

    if content_type.contains("charset=utf-8") {
        return decode_utf8(bytes);
    }

    if let Ok(text) = decode_utf8(bytes) {
        return Ok(text);
    }

    if let Ok(text) = decode_big5(bytes) {
        return Ok(text);
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]).to_lowercase();
    if head.contains("charset=big5") {
        let (cow, _, _) = BIG5.decode(bytes);
        return Ok(cow.into_owned());
    }

    Err(FetchError::Decode(
        "Failed to decode content with UTF-8 or Big5".to_string(),
    ))
}

fn decode_utf8(bytes: &[u8]) -> Result<String, FetchError> {
    let (cow, _encoding, had_errors) = UTF_8.decode(bytes);

    if had_errors {
        return Err(FetchError::Decode("UTF-8 decoding errors".to_string()));
    }

    Ok(cow.into_owned())
}

fn decode_big5(bytes: &[u8]) -> Result<String, FetchError> {
    let (cow, _encoding, had_errors) = BIG5.decode(bytes);

    if had_errors {
        return Err(FetchError::Decode("Big5 decoding errors".to_string()));
    }

    Ok(cow.into_owned())
}
