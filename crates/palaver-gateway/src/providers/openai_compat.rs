//! FreeGPT and other keyless OpenAI-compatible endpoints
//!
//! Reuses the OpenAI wire format with a configurable base URL and no
//! authorization header.

use async_trait::async_trait;

use crate::config::FreeGptConfig;
use crate::error::ProviderError;

use super::openai::OpenAiProvider;
use super::types::{ChatProvider, ChatTurn};

/// OpenAI-compatible provider — wraps [`OpenAiProvider`] with a custom
/// endpoint and no key requirement
pub struct OpenAiCompatProvider {
    inner: OpenAiProvider,
    name: String,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.name)
            .field("inner", &self.inner)
            .finish()
    }
}

impl OpenAiCompatProvider {
    /// FreeGPT: fixed model and generation parameters, no API key
    pub fn freegpt(config: &FreeGptConfig) -> Self {
        Self {
            inner: OpenAiProvider::with_endpoint(
                "freegpt",
                None,
                config.endpoint.clone(),
                "gpt-3.5-turbo".to_string(),
                500,
                0.7,
                config.headers.clone(),
            ),
            name: "freegpt".to_string(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ProviderError> {
        self.inner.validate()
    }

    async fn chat(&self, turns: &[ChatTurn], system: &str) -> Result<String, ProviderError> {
        self.inner.chat(turns, system).await
    }
}
