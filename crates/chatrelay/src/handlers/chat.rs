//! Chat dispatch handler.
//!
//! Validates the caller's request, builds a client for the requested
//! provider, makes a single completion call, and returns the text as JSON.

use std::borrow::Cow;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::llm::{LLMError, Message, ModelRequest, Usage};
use crate::response;
use crate::server::AppState;

/// Request header carrying the caller's provider API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// System turn sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

const TEMPERATURE: f32 = 0.0;
const MAX_OUTPUT_TOKENS: u32 = 1024;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    pub model: String,
    pub provider: String,
}

impl ChatRequest {
    const FIELDS: [&'static str; 3] = ["prompt", "model", "provider"];

    /// Parse a request body, reporting every required field that is absent,
    /// null, not a string, or empty.
    pub fn from_body(body: &[u8]) -> Result<Self, ChatError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ChatError::InvalidBody(e.to_string()))?;
        info!(body = %value, "parsed request JSON");

        let Value::Object(fields) = value else {
            return Err(ChatError::InvalidBody("expected a JSON object".to_string()));
        };

        let field = |name: &str| {
            fields
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match (field("prompt"), field("model"), field("provider")) {
            (Some(prompt), Some(model), Some(provider)) => Ok(Self {
                prompt,
                model,
                provider,
            }),
            (prompt, model, provider) => {
                let present = [prompt.is_some(), model.is_some(), provider.is_some()];
                let missing = Self::FIELDS
                    .into_iter()
                    .zip(present)
                    .filter_map(|(name, ok)| (!ok).then_some(name))
                    .collect();
                Err(ChatError::MissingFields(missing))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub provider: String,
    pub usage: Option<Usage>,
}

// ============================================================================
// Errors
// ============================================================================

/// Failures of a chat dispatch, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("{}", construction_message(.0))]
    ClientConstruction(LLMError),

    #[error("{0}")]
    Upstream(LLMError),
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::MissingApiKey => StatusCode::UNAUTHORIZED,
            ChatError::InvalidBody(_)
            | ChatError::MissingFields(_)
            | ChatError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
            ChatError::ClientConstruction(_) | ChatError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn construction_message(err: &LLMError) -> String {
    match err {
        LLMError::UnexpectedArgument { argument } if argument == "proxies" => {
            "API key format error: The API key contains unexpected 'proxies' parameter. \
             Please provide a plain API key string."
                .to_string()
        }
        LLMError::UnexpectedArgument { argument } => format!(
            "API configuration error: unexpected argument '{argument}'. \
             Please check your API key format."
        ),
        LLMError::InvalidCredential(reason) => {
            format!("API configuration error: {reason}. Please check your API key format.")
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self.status() {
            StatusCode::UNAUTHORIZED => response::unauthorized(message).into_response(),
            StatusCode::BAD_REQUEST => response::bad_request(message).into_response(),
            _ => response::internal_error(message).into_response(),
        }
    }
}

// ============================================================================
// Handler
// ============================================================================

/// Any method on `/` or `/invoke_chat_models`.
///
/// `OPTIONS` is answered with 204 before anything else is inspected. CORS
/// headers are added by the router for every response.
pub async fn invoke_chat(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    info!(%method, "chat dispatch triggered");

    if method == Method::OPTIONS {
        info!("received preflight OPTIONS request");
        return StatusCode::NO_CONTENT.into_response();
    }

    match dispatch(&state, &headers, &body).await {
        Ok(chat_response) => (StatusCode::OK, Json(chat_response)).into_response(),
        Err(e) => {
            if e.status().is_server_error() {
                error!(error = %e, "chat dispatch failed");
            } else {
                warn!(status = e.status().as_u16(), error = %e, "rejected chat request");
            }
            e.into_response()
        }
    }
}

async fn dispatch(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<ChatResponse, ChatError> {
    let api_key = api_key(headers).ok_or(ChatError::MissingApiKey)?;
    let request = ChatRequest::from_body(body)?;

    info!(
        provider = %request.provider,
        model = %request.model,
        "initializing chat model"
    );

    let client = state
        .providers
        .create(&request.provider, &request.model, &api_key)
        .map_err(ChatError::ClientConstruction)?
        .ok_or_else(|| ChatError::UnsupportedProvider(request.provider.clone()))?;

    let model_request = ModelRequest {
        model: request.model.clone(),
        messages: vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(request.prompt),
        ],
        temperature: Some(TEMPERATURE),
        max_tokens: Some(MAX_OUTPUT_TOKENS),
    };

    info!(provider = %request.provider, "sending messages to chat model");
    let model_response = client
        .chat(model_request)
        .await
        .map_err(ChatError::Upstream)?;
    info!(provider = %request.provider, "received response from chat model");

    Ok(ChatResponse {
        content: model_response.content,
        model: request.model,
        provider: request.provider,
        usage: model_response.usage,
    })
}

/// The caller's API key, or `None` when the header is absent or blank.
fn api_key(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    let value = headers.get(API_KEY_HEADER)?;
    let key = String::from_utf8_lossy(value.as_bytes());
    (!key.trim().is_empty()).then_some(key)
}

// ============================================================================
// Tests
// ============================================================================
