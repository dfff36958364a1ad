//! HTTP client for fetching server-rendered pages
//!
//! This module provides the HTTP client behind the snapshot engine. It sets
//! browser-like headers, applies a request timeout and retries transient
//! server errors with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use tokio::time::sleep;

use crate::driver::snapshot::PageSource;
use crate::error::{Result, ScrapeError};

/// Default User-Agent mimicking a modern browser
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default Accept-Language header for Traditional Chinese content
const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-HK,zh;q=0.9,en;q=0.8";

/// Configuration for the page client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Retries after a 5xx response (default: 3)
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds (default: 1000)
    pub retry_base_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

/// HTTP client for page fetches with retry logic
///
/// This client automatically:
/// - Retries on server errors (5xx) with exponential backoff
/// - Maps 404 to `ScrapeError::NotFound`
/// - Sets headers for Traditional Chinese content
pub struct PageClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    config: ClientConfig,
}

impl PageClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );

        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch the HTML of an absolute URL
    ///
    /// # Errors
    /// - `ScrapeError::NotFound` - Server returned 404
    /// - `ScrapeError::HttpError` - Network error, or an error status after all retries
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let mut attempt = 0;

        loop {
            debug!("GET {} (attempt {})", url, attempt + 1);
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }

            // No point retrying a missing page
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ScrapeError::NotFound(url.to_string()));
            }

            if status.is_server_error() && attempt < self.config.max_retries {
                let delay = self.backoff_delay(attempt);
                warn!("{} returned {}, retrying in {:?}", url, status, delay);
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            response.error_for_status()?;
            return Err(ScrapeError::ParseError(format!(
                "unexpected status {} for {}",
                status, url
            )));
        }
    }

    /// Calculate exponential backoff delay for retry
    fn backoff_delay(&self, attempt: u32) -> Duration {
        // 1s, 2s, 4s, ... with the default base
        Duration::from_millis(self.config.retry_base_delay_ms * 2u64.pow(attempt))
    }
}

#[async_trait]
impl PageSource for PageClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        PageClient::fetch(self, url).await
    }
}
