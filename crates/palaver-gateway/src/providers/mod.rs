//! Multi-provider chat abstraction layer
//!
//! Each backend implements the [`ChatProvider`] trait: shape the bounded
//! context window into its own wire format, issue one HTTP POST, and
//! normalize the reply or classify the failure. The active backend is
//! selected once from configuration by [`build_provider`]; adding a
//! backend means adding a module and one match arm here.

pub mod anthropic;
pub mod generic;
pub mod google;
pub mod huggingface;
pub mod local;
pub mod openai;
pub mod openai_compat;
pub mod rapidapi;
pub mod types;

pub use local::{Clock, LocalProvider, SystemClock};
pub use types::{ChatProvider, ChatTurn, Sender};

use crate::config::GatewayConfig;
use crate::error::ProviderError;

/// Instantiate the configured backend
pub fn build_provider(config: &GatewayConfig) -> Result<Box<dyn ChatProvider>, ProviderError> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(openai::OpenAiProvider::new(&config.openai))),
        "anthropic" => Ok(Box::new(anthropic::AnthropicProvider::new(
            &config.anthropic,
        ))),
        "google" => Ok(Box::new(google::GoogleProvider::new(&config.google))),
        "rapidapi" => Ok(Box::new(rapidapi::RapidApiProvider::new(&config.rapidapi))),
        "freegpt" => Ok(Box::new(openai_compat::OpenAiCompatProvider::freegpt(
            &config.freegpt,
        ))),
        "huggingface" => Ok(Box::new(huggingface::HuggingFaceProvider::new(
            &config.huggingface,
        ))),
        "alternative" => Ok(Box::new(generic::GenericProvider::alternative(
            &config.alternative,
        ))),
        "custom" => Ok(Box::new(generic::GenericProvider::custom(&config.custom))),
        "local" => Ok(Box::new(local::LocalProvider::new(&config.local))),
        other => Err(ProviderError::Unsupported(other.to_string())),
    }
}
