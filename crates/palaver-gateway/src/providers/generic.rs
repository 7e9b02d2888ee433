//! Single-field text endpoints: the "alternative" free service and
//! user-supplied custom endpoints
//!
//! Both speak a loose schema. The alternative endpoint takes only the
//! current message; a custom endpoint additionally receives the windowed
//! history and the system prompt. Replies are probed from a short list of
//! known field names, with a placeholder string when none is present.

use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use async_trait::async_trait;

use crate::config::{AlternativeConfig, CustomConfig};
use crate::error::ProviderError;

use super::types::{ChatProvider, ChatTurn, is_placeholder};

/// Which loose-schema flavor this endpoint speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    /// `{ "text": message }`, reply in `output` or `text`
    Alternative,
    /// `{ "message", "chatHistory", "systemPrompt" }`, reply in
    /// `response`, `message`, or `text`. Endpoint must be configured.
    Custom,
}

pub struct GenericProvider {
    client: Client,
    flavor: Flavor,
    endpoint: String,
    api_key: String,
    headers: HashMap<String, String>,
}

impl std::fmt::Debug for GenericProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericProvider")
            .field("flavor", &self.flavor)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GenericProvider {
    pub fn alternative(config: &AlternativeConfig) -> Self {
        Self::build(
            Flavor::Alternative,
            config.endpoint.clone(),
            config.api_key.clone(),
            config.headers.clone(),
        )
    }

    pub fn custom(config: &CustomConfig) -> Self {
        Self::build(
            Flavor::Custom,
            config.endpoint.clone(),
            config.api_key.clone(),
            config.headers.clone(),
        )
    }

    fn build(
        flavor: Flavor,
        endpoint: String,
        api_key: String,
        headers: HashMap<String, String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            flavor,
            endpoint,
            api_key,
            headers,
        }
    }

    fn build_body(&self, turns: &[ChatTurn], system: &str) -> Value {
        let message = turns.last().map(|t| t.content.as_str()).unwrap_or("");
        match self.flavor {
            Flavor::Alternative => serde_json::json!({ "text": message }),
            Flavor::Custom => {
                // History excludes the current message, which travels in
                // its own field
                let history = &turns[..turns.len().saturating_sub(1)];
                serde_json::json!({
                    "message": message,
                    "chatHistory": history,
                    "systemPrompt": system,
                })
            }
        }
    }

    fn extract_reply(&self, body: &Value) -> String {
        let (fields, placeholder): (&[&str], &str) = match self.flavor {
            Flavor::Alternative => (&["output", "text"], "No response generated"),
            Flavor::Custom => (&["response", "message", "text"], "No response received"),
        };
        fields
            .iter()
            .find_map(|field| body.get(field).and_then(Value::as_str))
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| placeholder.to_string())
    }

    fn name(&self) -> &'static str {
        match self.flavor {
            Flavor::Alternative => "alternative",
            Flavor::Custom => "custom",
        }
    }
}

#[async_trait]
impl ChatProvider for GenericProvider {
    fn provider_name(&self) -> &str {
        self.name()
    }

    fn validate(&self) -> Result<(), ProviderError> {
        if self.flavor == Flavor::Custom && is_placeholder(&self.endpoint) {
            return Err(ProviderError::Configuration(
                "Custom API endpoint not configured. Add your endpoint to the [custom] \
                 section of the config file"
                    .to_string(),
            ));
        }
        Ok(())
    }

    async fn chat(&self, turns: &[ChatTurn], system: &str) -> Result<String, ProviderError> {
        let body = self.build_body(turns, system);

        debug!("{} request: endpoint={}", self.name(), self.endpoint);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }
        for (header, value) in &self.headers {
            request = request.header(header, value);
        }

        let response = request.send().await.map_err(|e| ProviderError::Network {
            provider: self.name().to_string(),
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
            provider: self.name().to_string(),
            message: e.to_string(),
        })?;

        Ok(self.extract_reply(&body))
    }
}
