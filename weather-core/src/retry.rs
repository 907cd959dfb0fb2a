//! Bounded retry with exponential backoff for forecast requests.
//!
//! Retried: timeouts, connection failures (refused, reset, dropped), 5xx,
//! 408 and 429. Everything else (other 4xx, request-building errors, bodies
//! that fail to decode) fails at once.

use std::{future::Future, time::Duration};

use reqwest::{Response, StatusCode};

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 200;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    /// Doubles on each attempt.
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

pub fn is_retryable_error(error: &reqwest::Error) -> RetryDecision {
    // Malformed requests and unreadable bodies fail the same way every time.
    if error.is_builder() || error.is_body() || error.is_decode() || error.is_redirect() {
        return RetryDecision::NoRetry;
    }
    // Request errors cover connections dropped or reset mid-exchange.
    if error.is_timeout() || error.is_connect() || error.is_request() {
        return RetryDecision::Retry;
    }
    match error.status() {
        Some(status) => is_retryable_status(status),
        None => RetryDecision::NoRetry,
    }
}

pub fn is_retryable_status(status: StatusCode) -> RetryDecision {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        RetryDecision::Retry
    } else {
        RetryDecision::NoRetry
    }
}

/// Run `operation` until it yields a non-retryable outcome or the attempts
/// run out.
///
/// When retries are exhausted on a retryable status, the last response is
/// returned so the caller can report its status.
pub async fn with_retry<F, Fut>(config: &RetryConfig, operation: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = config.delay_for_attempt(attempt - 1);
            tracing::warn!(
                "Retry attempt {} of {}, waiting {:?}",
                attempt,
                config.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }

        let exhausted = attempt >= config.max_retries;

        match operation().await {
            Ok(response) => {
                let status = response.status();
                if is_retryable_status(status) == RetryDecision::Retry && !exhausted {
                    tracing::debug!("Request returned retryable status {}", status);
                    attempt += 1;
                    continue;
                }
                if exhausted && attempt > 0 && !status.is_success() {
                    tracing::error!("All {} attempts exhausted", config.max_retries + 1);
                }
                return Ok(response);
            }
            Err(e) => {
                if is_retryable_error(&e) == RetryDecision::NoRetry {
                    tracing::debug!("Non-retryable error: {}", e);
                    return Err(e);
                }
                if exhausted {
                    tracing::error!("All {} attempts exhausted: {}", config.max_retries + 1, e);
                    return Err(e);
                }
                tracing::debug!("Retryable error on attempt {}: {}", attempt + 1, e);
                attempt += 1;
            }
        }
    }
}
