//! Shared outbound HTTP plumbing: client construction, bounded retry with
//! exponential backoff for idempotent GETs, and response decoding.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};

/// Status codes worth retrying; anything else is returned to the caller as-is.
pub const RETRYABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Retry schedule for idempotent GETs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each following one.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << retry.min(16))
    }
}

/// Builds a client with a fixed per-request timeout.
pub fn build_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Sends a GET, retrying on 5xx statuses and connection/timeout failures.
///
/// Once retries are exhausted the last response is returned even if its
/// status is retryable; status handling is left to the caller. A transport
/// failure on the last attempt becomes [`AppError::Network`].
pub async fn get_with_retry<Q: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    query: &Q,
    policy: &RetryPolicy,
    provider: &'static str,
) -> AppResult<Response> {
    let mut retry = 0u32;

    loop {
        match client.get(url).query(query).send().await {
            Ok(response)
                if is_retryable_status(response.status().as_u16())
                    && retry < policy.max_retries =>
            {
                tracing::warn!(
                    provider,
                    status = response.status().as_u16(),
                    attempt = retry + 1,
                    "Upstream returned a server error, retrying"
                );
            }
            Ok(response) => return Ok(response),
            Err(e) if is_retryable_error(&e) && retry < policy.max_retries => {
                tracing::warn!(
                    provider,
                    attempt = retry + 1,
                    error = %e,
                    "Upstream request failed, retrying"
                );
            }
            Err(e) => {
                tracing::error!(provider, error = %e, "Upstream request failed");
                return Err(AppError::Network(e));
            }
        }

        tokio::time::sleep(policy.delay_for(retry)).await;
        retry += 1;
    }
}

/// Reads `pointer` (e.g. `/error/message`) out of a JSON error body.
pub fn json_error_message(body: &str, pointer: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.pointer(pointer)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Decodes a successful response body, reporting undecodable JSON as an upstream error.
pub async fn decode_json<T: DeserializeOwned>(
    response: Response,
    provider: &'static str,
) -> AppResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::error!(provider, error = %e, "Failed to decode upstream response");
        AppError::malformed(provider, "Failed to decode JSON")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_does_not_overflow() {
        let policy = RetryPolicy {
            max_retries: 100,
            backoff: Duration::from_secs(1),
        };
        assert!(policy.delay_for(90) >= policy.delay_for(16));
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [500, 502, 503, 504] {
            assert!(is_retryable_status(status));
        }
        for status in [200, 400, 401, 404, 429, 501] {
            assert!(!is_retryable_status(status));
        }
    }

    #[test]
    fn test_json_error_message() {
        let body = r#"{"status_code": 7, "status_message": "Invalid API key"}"#;
        assert_eq!(
            json_error_message(body, "/status_message").as_deref(),
            Some("Invalid API key")
        );

        let body = r#"{"error": {"code": 400, "message": "EMAIL_EXISTS"}}"#;
        assert_eq!(
            json_error_message(body, "/error/message").as_deref(),
            Some("EMAIL_EXISTS")
        );

        assert_eq!(json_error_message("<html>", "/error/message"), None);
        assert_eq!(json_error_message("{}", "/error/message"), None);
    }
}
