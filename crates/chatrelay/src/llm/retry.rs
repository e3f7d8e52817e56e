//! Bounded retries for provider HTTP calls.
//!
//! Retries live inside the provider clients. The chat handler itself never
//! repeats a request.

use std::time::Duration;

use rand::Rng;
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::warn;

use super::error::{LLMError, response_error, retry_after_secs};

const BASE_DELAY: Duration = Duration::from_millis(500);
const MAX_DELAY: Duration = Duration::from_secs(8);
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);
const MAX_JITTER_MS: u64 = 250;

/// Send a request, retrying transient failures up to `max_retries` extra times.
///
/// `build` is called once per attempt since a `RequestBuilder` is consumed by `send`.
/// Returns the first successful response, or the error from the final attempt.
pub async fn send_with_retries<F>(max_retries: u32, mut build: F) -> Result<Response, LLMError>
where
    F: FnMut() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                if attempt < max_retries && is_retryable_status(status) {
                    let delay = retry_after_secs(&response)
                        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
                        .unwrap_or_else(|| backoff(attempt));
                    warn!(
                        status = status.as_u16(),
                        attempt = attempt + 1,
                        max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "provider returned retryable status"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                return Err(response_error(response).await);
            }
            Err(e) => {
                if attempt < max_retries && is_retryable_error(&e) {
                    let delay = backoff(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "provider request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                return Err(LLMError::Request(e));
            }
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 409 | 429) || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Exponential backoff with a small random jitter.
fn backoff(attempt: u32) -> Duration {
    let exp = BASE_DELAY.saturating_mul(2u32.saturating_pow(attempt));
    let jitter = Duration::from_millis(rand::rng().random_range(0..=MAX_JITTER_MS));
    exp.min(MAX_DELAY) + jitter
}
