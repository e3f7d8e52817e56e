//! LLM error types.

use thiserror::Error;

/// Turn a non-success provider response into an error, keeping the provider's body.
///
/// 429 becomes `RateLimit`; every other status becomes `Api`.
pub(crate) async fn response_error(response: reqwest::Response) -> LLMError {
    let status = response.status().as_u16();
    let retry_after = retry_after_secs(&response);
    let message = response.text().await.unwrap_or_default();

    if status == 429 {
        return LLMError::RateLimit {
            retry_after,
            message,
        };
    }
    LLMError::Api { status, message }
}

/// Parse a `retry-after` header given in whole seconds.
pub(crate) fn retry_after_secs(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Errors that can occur when building a provider client or making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited (429)
    #[error("rate limited (status 429): {message}")]
    RateLimit {
        retry_after: Option<u64>,
        message: String,
    },

    /// The credential carried a field that is not part of a plain API key.
    #[error("unexpected argument '{argument}' in credential")]
    UnexpectedArgument { argument: String },

    /// The credential cannot be used as an API key.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The underlying HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(reqwest::Error),
}
