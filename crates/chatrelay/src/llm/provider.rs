//! LLM provider trait and provider identifiers.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::header::HeaderValue;

use super::error::LLMError;
use super::types::{ModelRequest, ModelResponse};

/// Trait for LLM providers with different API formats.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Make a single, non-streaming chat completion request.
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, LLMError>;
}

/// Providers recognized by name in incoming requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Google,
    XAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Google => "Google",
            Provider::XAi => "xAI",
        }
    }

    /// Whether the factory can build a client for this provider.
    pub fn is_wired(&self) -> bool {
        matches!(self, Provider::OpenAI | Provider::Anthropic)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a provider name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OpenAI" => Ok(Provider::OpenAI),
            "Anthropic" => Ok(Provider::Anthropic),
            "Google" => Ok(Provider::Google),
            "xAI" => Ok(Provider::XAi),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Keys that may name the API key itself inside a structured credential.
const KEY_FIELDS: &[&str] = &["api_key", "apiKey"];

/// Validate a caller-supplied credential and return it as a plain API key.
///
/// The credential is trimmed. A JSON object is rejected: it is a client
/// configuration blob rather than a key, and any field besides the key itself
/// is reported as an unexpected argument (`proxies` first, when present).
pub fn plain_api_key(raw: &str) -> Result<String, LLMError> {
    let key = raw.trim();

    if key.starts_with('{')
        && let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(key)
    {
        if fields.contains_key("proxies") {
            return Err(LLMError::UnexpectedArgument {
                argument: "proxies".to_string(),
            });
        }
        if let Some(extra) = fields.keys().find(|k| !KEY_FIELDS.contains(&k.as_str())) {
            return Err(LLMError::UnexpectedArgument {
                argument: extra.clone(),
            });
        }
        return Err(LLMError::InvalidCredential(
            "expected a plain API key string, got a JSON object".to_string(),
        ));
    }

    if key.is_empty() {
        return Err(LLMError::InvalidCredential("API key is empty".to_string()));
    }

    if HeaderValue::from_str(key).is_err() {
        return Err(LLMError::InvalidCredential(
            "API key contains characters not allowed in an HTTP header".to_string(),
        ));
    }

    Ok(key.to_string())
}
