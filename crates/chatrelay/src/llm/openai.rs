//! OpenAI chat completions provider.

use async_trait::async_trait;
use reqwest::Client;

use super::error::LLMError;
use super::provider::LLMProvider;
use super::retry::send_with_retries;
use super::types::{ModelRequest, ModelResponse, Usage};

/// OpenAI provider bound to one API key.
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl OpenAIProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    #[must_use]
    pub fn new(client: Client, base_url: String, api_key: String, max_retries: u32) -> Self {
        Self {
            client,
            base_url,
            api_key,
            max_retries,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, LLMError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = send_with_retries(self.max_retries, || {
            self.client
                .post(&url)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&request)
        })
        .await?;

        let completion: Response = response.json().await?;
        Ok(from_response(completion))
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(serde::Deserialize)]
struct Response {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(serde::Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Assistant message; `content` is null when the model only returned a refusal or tool call.
#[derive(serde::Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn from_response(response: Response) -> ModelResponse {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    ModelResponse {
        content,
        usage: response.usage,
    }
}
