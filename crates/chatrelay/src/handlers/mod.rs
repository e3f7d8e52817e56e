//! HTTP request handlers.

mod chat;
mod health;

pub use chat::{API_KEY_HEADER, ChatError, ChatRequest, ChatResponse, invoke_chat};
pub use health::{livez, readyz};
