//! Provider client factory.
//!
//! Builds one chat client per request from a provider name, a model name and
//! the caller's credential. HTTP connection pools are created once at startup
//! and shared by every client the factory hands out.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, warn};

use super::anthropic::AnthropicProvider;
use super::error::LLMError;
use super::openai::OpenAIProvider;
use super::provider::{LLMProvider, Provider, plain_api_key};
use crate::config::ProvidersConfig;

/// Creates provider clients for the chat handler.
#[derive(Clone)]
pub struct ProviderFactory {
    config: ProvidersConfig,
    openai_client: Client,
    anthropic_client: Client,
}

impl ProviderFactory {
    /// Build the shared HTTP clients for every wired provider.
    pub fn new(config: ProvidersConfig) -> Result<Self, LLMError> {
        let openai_client = http_client(config.openai.timeout_seconds)?;
        let anthropic_client = http_client(config.anthropic.timeout_seconds)?;
        Ok(Self {
            config,
            openai_client,
            anthropic_client,
        })
    }

    /// Create a chat client for `provider_name`.
    ///
    /// Returns `Ok(None)` when the name is unknown or names a provider that is
    /// recognized but not wired up. Returns an error when the credential cannot
    /// be turned into a client.
    pub fn create(
        &self,
        provider_name: &str,
        model: &str,
        credential: &str,
    ) -> Result<Option<Box<dyn LLMProvider>>, LLMError> {
        let provider = match provider_name.parse::<Provider>() {
            Ok(provider) => provider,
            Err(_) => {
                error!(provider = %provider_name, "unsupported provider");
                return Ok(None);
            }
        };

        if !provider.is_wired() {
            warn!(%provider, "provider is recognized but not wired up");
            return Ok(None);
        }

        let api_key = plain_api_key(credential).inspect_err(|e| {
            error!(%provider, model, error = %e, "error initializing chat model");
        })?;

        debug!(%provider, model, "building chat client");

        let client: Box<dyn LLMProvider> = match provider {
            Provider::OpenAI => Box::new(OpenAIProvider::new(
                self.openai_client.clone(),
                self.config.openai.base_url.clone(),
                api_key,
                self.config.openai.max_retries,
            )),
            Provider::Anthropic => Box::new(AnthropicProvider::new(
                self.anthropic_client.clone(),
                self.config.anthropic.base_url.clone(),
                api_key,
                self.config.anthropic.api_version.clone(),
                self.config.anthropic.max_retries,
            )),
            Provider::Google | Provider::XAi => return Ok(None),
        };

        Ok(Some(client))
    }
}

/// Build an HTTP client; `None` leaves requests without a timeout.
fn http_client(timeout_seconds: Option<u64>) -> Result<Client, LLMError> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().map_err(LLMError::Client)
}
