//! LLM provider clients for chat completions.

mod anthropic;
mod error;
mod factory;
mod openai;
mod provider;
mod retry;
mod types;

pub use anthropic::AnthropicProvider;
pub use error::LLMError;
pub use factory::ProviderFactory;
pub use openai::OpenAIProvider;
pub use provider::{LLMProvider, Provider, UnknownProvider, plain_api_key};
pub use types::{Message, ModelRequest, ModelResponse, Role, Usage};
