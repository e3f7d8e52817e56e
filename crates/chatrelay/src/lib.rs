//! Chatrelay - a stateless HTTP relay that forwards one prompt to an LLM
//! provider using the caller's own API key.

pub mod config;
pub mod handlers;
pub mod llm;
pub mod response;
pub mod server;
