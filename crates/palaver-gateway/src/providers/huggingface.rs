//! Hugging Face inference API provider
//!
//! Single-turn only: the inference endpoint takes one `inputs` string, so
//! neither history nor the system prompt is sent.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use async_trait::async_trait;

use crate::config::HuggingFaceConfig;
use crate::error::ProviderError;

use super::types::{ChatProvider, ChatTurn};

pub struct HuggingFaceProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    max_length: u32,
    temperature: f32,
}

impl std::fmt::Debug for HuggingFaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceProvider")
            .field("endpoint", &self.endpoint)
            .field("max_length", &self.max_length)
            .finish()
    }
}

impl HuggingFaceProvider {
    pub fn new(config: &HuggingFaceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            max_length: config.max_length,
            temperature: config.temperature,
        }
    }

    /// The API answers either `[{"generated_text": ...}]` or a bare
    /// `{"generated_text": ...}` depending on the model
    fn extract_reply(body: &Value) -> String {
        body.pointer("/0/generated_text")
            .or_else(|| body.get("generated_text"))
            .and_then(Value::as_str)
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| "No response generated".to_string())
    }
}

#[async_trait]
impl ChatProvider for HuggingFaceProvider {
    fn provider_name(&self) -> &str {
        "huggingface"
    }

    async fn chat(&self, turns: &[ChatTurn], _system: &str) -> Result<String, ProviderError> {
        // Only the current message is sent; it is the last turn of the window
        let message = turns.last().map(|t| t.content.as_str()).unwrap_or("");

        let body = serde_json::json!({
            "inputs": message,
            "parameters": {
                "max_length": self.max_length,
                "temperature": self.temperature,
            },
        });

        debug!("Hugging Face request: endpoint={}", self.endpoint);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = request.send().await.map_err(|e| ProviderError::Network {
            provider: "huggingface".to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await.map_err(|e| ProviderError::Parse {
            provider: "huggingface".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self::extract_reply(&body))
    }
}
