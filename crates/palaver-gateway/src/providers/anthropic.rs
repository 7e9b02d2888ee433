//! Anthropic Claude provider

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use async_trait::async_trait;

use crate::config::AnthropicConfig;
use crate::error::ProviderError;

use super::types::{ChatProvider, ChatTurn, is_placeholder};

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(config: &AnthropicConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Shape the context window into the messages array. The system prompt
    /// travels in the top-level `system` field, never in the array.
    fn build_messages(turns: &[ChatTurn]) -> Vec<AnthropicMessage> {
        turns
            .iter()
            .map(|turn| AnthropicMessage {
                role: turn.sender.role().to_string(),
                content: turn.content.clone(),
            })
            .collect()
    }

    fn extract_reply(&self, resp: AnthropicApiResponse) -> Result<String, ProviderError> {
        resp.content
            .into_iter()
            .next()
            .map(|block| block.text.trim().to_string())
            .ok_or_else(|| ProviderError::ResponseFormat {
                provider: "anthropic".to_string(),
            })
    }
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn validate(&self) -> Result<(), ProviderError> {
        if is_placeholder(&self.api_key) {
            return Err(ProviderError::Configuration(
                "Anthropic API key not configured. Add your key to the [anthropic] section \
                 of the config file"
                    .to_string(),
            ));
        }
        Ok(())
    }

    async fn chat(&self, turns: &[ChatTurn], system: &str) -> Result<String, ProviderError> {
        let messages = Self::build_messages(turns);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": messages,
        });

        debug!(
            "Anthropic request: model={}, messages={}",
            self.model,
            messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                provider: "anthropic".to_string(),
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

        let api_response: AnthropicApiResponse =
            response.json().await.map_err(|e| ProviderError::Parse {
                provider: "anthropic".to_string(),
                message: e.to_string(),
            })?;

        self.extract_reply(api_response)
    }
}

// ── Anthropic wire types ──

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AnthropicApiResponse {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnthropicBlock {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(&AnthropicConfig {
            api_key: "sk-ant-live".to_string(),
            ..AnthropicConfig::default()
        })
    }

    #[test]
    fn test_build_messages_no_system_role() {
        let turns = vec![ChatTurn::user("hello"), ChatTurn::assistant("hi")];
        let messages = AnthropicProvider::build_messages(&turns);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
        assert!(messages.iter().all(|m| m.role != "system"));
    }

    #[test]
    fn test_extract_reply() {
        let resp: AnthropicApiResponse =
            serde_json::from_str(r#"{"content":[{"type":"text","text":"  Hello! "}]}"#).unwrap();
        assert_eq!(provider().extract_reply(resp).unwrap(), "Hello!");
    }

    #[test]
    fn test_extract_reply_empty_content() {
        let resp: AnthropicApiResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(matches!(
            provider().extract_reply(resp),
            Err(ProviderError::ResponseFormat { provider }) if provider == "anthropic"
        ));
    }

    #[test]
    fn test_validate_placeholder_key() {
        let p = AnthropicProvider::new(&AnthropicConfig::default());
        assert!(matches!(p.validate(), Err(ProviderError::Configuration(_))));
        assert!(provider().validate().is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", provider());
        assert!(!debug.contains("sk-ant-live"));
    }
}
