//! Gateway configuration
//!
//! One immutable value holding the active provider selector, one record per
//! backend, and the shared chat settings. Deserialized from TOML; every
//! field has a default mirroring the shipped sample config, so a minimal
//! file only needs to name the provider and fill in a credential.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Top-level gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Active provider identifier: "openai", "anthropic", "google",
    /// "rapidapi", "freegpt", "huggingface", "alternative", "local",
    /// or "custom"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub rapidapi: RapidApiConfig,
    #[serde(default)]
    pub freegpt: FreeGptConfig,
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
    #[serde(default)]
    pub alternative: AlternativeConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub custom: CustomConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            chat: ChatSettings::default(),
            openai: OpenAiConfig::default(),
            anthropic: AnthropicConfig::default(),
            google: GoogleConfig::default(),
            rapidapi: RapidApiConfig::default(),
            freegpt: FreeGptConfig::default(),
            huggingface: HuggingFaceConfig::default(),
            alternative: AlternativeConfig::default(),
            local: LocalConfig::default(),
            custom: CustomConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

fn default_provider() -> String {
    "local".to_string()
}

/// Shared chat settings, provider-independent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Number of previous turns to include in the context window
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Per-request deadline for network providers, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            system_prompt: default_system_prompt(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_max_history() -> usize {
    10
}
fn default_system_prompt() -> String {
    "You are a helpful AI assistant. Be friendly, informative, and concise in your responses. \
     Keep responses under 200 words unless specifically asked for more detail."
        .to_string()
}
fn default_request_timeout_secs() -> u64 {
    60
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "openai_placeholder_key")]
    pub api_key: String,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: openai_placeholder_key(),
            endpoint: default_openai_endpoint(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn openai_placeholder_key() -> String {
    "YOUR_OPENAI_API_KEY_HERE".to_string()
}
fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f32 {
    0.7
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default = "anthropic_placeholder_key")]
    pub api_key: String,
    #[serde(default = "default_anthropic_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_anthropic_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: anthropic_placeholder_key(),
            endpoint: default_anthropic_endpoint(),
            model: default_anthropic_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn anthropic_placeholder_key() -> String {
    "YOUR_ANTHROPIC_API_KEY_HERE".to_string()
}
fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}
fn default_anthropic_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "google_placeholder_key")]
    pub api_key: String,
    #[serde(default = "default_google_base_url")]
    pub base_url: String,
    #[serde(default = "default_google_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: google_placeholder_key(),
            base_url: default_google_base_url(),
            model: default_google_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn google_placeholder_key() -> String {
    "YOUR_GOOGLE_API_KEY_HERE".to_string()
}
fn default_google_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_google_model() -> String {
    "gemini-pro".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RapidApiConfig {
    #[serde(default = "rapidapi_placeholder_key")]
    pub api_key: String,
    #[serde(default = "default_rapidapi_host")]
    pub host: String,
    #[serde(default = "default_rapidapi_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_rapidapi_temperature")]
    pub temperature: f32,
    #[serde(default = "default_rapidapi_top_k")]
    pub top_k: u32,
    #[serde(default = "default_rapidapi_top_p")]
    pub top_p: f32,
    #[serde(default = "default_rapidapi_max_tokens")]
    pub max_tokens: u32,
}

impl Default for RapidApiConfig {
    fn default() -> Self {
        Self {
            api_key: rapidapi_placeholder_key(),
            host: default_rapidapi_host(),
            endpoint: default_rapidapi_endpoint(),
            temperature: default_rapidapi_temperature(),
            top_k: default_rapidapi_top_k(),
            top_p: default_rapidapi_top_p(),
            max_tokens: default_rapidapi_max_tokens(),
        }
    }
}

impl std::fmt::Debug for RapidApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapidApiConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("host", &self.host)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("top_k", &self.top_k)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn rapidapi_placeholder_key() -> String {
    "YOUR_RAPIDAPI_API_KEY_HERE".to_string()
}
fn default_rapidapi_host() -> String {
    "chatgpt-42.p.rapidapi.com".to_string()
}
fn default_rapidapi_endpoint() -> String {
    "https://chatgpt-42.p.rapidapi.com/matag2".to_string()
}
fn default_rapidapi_temperature() -> f32 {
    0.9
}
fn default_rapidapi_top_k() -> u32 {
    5
}
fn default_rapidapi_top_p() -> f32 {
    0.9
}
fn default_rapidapi_max_tokens() -> u32 {
    256
}

/// FreeGPT — an OpenAI-compatible endpoint that needs no key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeGptConfig {
    #[serde(default = "default_freegpt_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for FreeGptConfig {
    fn default() -> Self {
        Self {
            endpoint: default_freegpt_endpoint(),
            headers: HashMap::new(),
        }
    }
}

fn default_freegpt_endpoint() -> String {
    "https://api.freegpt.one/v1/chat/completions".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    #[serde(default = "default_huggingface_endpoint")]
    pub endpoint: String,
    /// Optional bearer token; the inference API also works without one
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_huggingface_max_length")]
    pub max_length: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_huggingface_endpoint(),
            api_key: String::new(),
            max_length: default_huggingface_max_length(),
            temperature: default_temperature(),
        }
    }
}

impl std::fmt::Debug for HuggingFaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &mask_secret(&self.api_key))
            .field("max_length", &self.max_length)
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn default_huggingface_endpoint() -> String {
    "https://api-inference.huggingface.co/models/microsoft/DialoGPT-large".to_string()
}
fn default_huggingface_max_length() -> u32 {
    100
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AlternativeConfig {
    #[serde(default = "default_alternative_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for AlternativeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_alternative_endpoint(),
            api_key: String::new(),
            headers: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for AlternativeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlternativeConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &mask_secret(&self.api_key))
            .field("headers", &self.headers.keys())
            .finish()
    }
}

fn default_alternative_endpoint() -> String {
    "https://api.deepai.org/api/text-generator".to_string()
}

/// Offline responder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Artificial thinking delay before replying, in milliseconds
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: default_response_delay_ms(),
        }
    }
}

fn default_response_delay_ms() -> u64 {
    1000
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CustomConfig {
    #[serde(default = "custom_placeholder_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for CustomConfig {
    fn default() -> Self {
        Self {
            endpoint: custom_placeholder_endpoint(),
            api_key: String::new(),
            headers: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for CustomConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &mask_secret(&self.api_key))
            .field("headers", &self.headers.keys())
            .finish()
    }
}

fn custom_placeholder_endpoint() -> String {
    "YOUR_CUSTOM_API_ENDPOINT".to_string()
}

/// Mask a secret for logs and Debug output, keeping a short prefix
pub(crate) fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        "<empty>".to_string()
    } else if secret.len() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", &secret[..4])
    }
}
