//! HTTP transport
//!
//! This module handles the raw HTTP traffic for every collaborator:
//! - Building HTTP clients with the configured user agent
//! - Per-request timeouts
//! - Status classification into `FetchError`
//! - Retry with exponential back-off on transient failures

use crate::config::UserAgentConfig;
use crate::FetchError;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Upper bound for a single back-off sleep
const MAX_DELAY_MS: u64 = 30_000;

/// Builds an HTTP client with proper configuration
///
/// Clients built with `cookies = true` keep a cookie jar, which the
/// translation source relies on to hold a per-locale session.
pub fn build_http_client(
    config: &UserAgentConfig,
    cookies: bool,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(cookies)
        .gzip(true)
        .brotli(true)
        .build()
}

/// How many times, and how patiently, a transient failure is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// Nominal delay before retry number `attempt` (1-based), without jitter
    ///
    /// | Attempt | Sleep               |
    /// |---------|---------------------|
    /// | 1       | base × 2⁰           |
    /// | 2       | base × 2¹           |
    /// | n       | base × 2ⁿ⁻¹, ≤ 30 s |
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let exp = attempt.saturating_sub(1).min(16);
        self.backoff_base_ms
            .saturating_mul(1u64 << exp)
            .min(MAX_DELAY_MS)
    }

    fn jittered_delay(&self, attempt: u32) -> Duration {
        let nominal = self.base_delay_ms(attempt) as f64;
        let factor = rand::random::<f64>() * 0.5 + 0.75;
        Duration::from_millis((nominal * factor) as u64)
    }

    /// Runs `operation`, retrying transient failures up to `max_retries` times
    ///
    /// Non-transient failures are returned immediately. After the last retry
    /// the final error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_transient() || attempt >= self.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay = self.jittered_delay(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        url = err.url(),
                        error = %err,
                        "Transient fetch error, retrying after back-off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// A client paired with a timeout and retry policy
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    policy: RetryPolicy,
    timeout: Duration,
}

impl Transport {
    pub fn new(client: Client, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            client,
            policy,
            timeout,
        }
    }

    /// GETs `url` and returns the body of a 2xx response
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.get_text_with_headers(url, HeaderMap::new()).await
    }

    /// GETs `url` with extra headers and returns the body of a 2xx response
    pub async fn get_text_with_headers(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<String, FetchError> {
        self.policy.run(|| self.attempt(url, headers.clone())).await
    }

    async fn attempt(&self, url: &str, headers: HeaderMap) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}
