//! OpenAI chat-completions provider
//!
//! Also the wire format behind [`super::openai_compat`] endpoints, which
//! reuse the same role-array schema with a different base URL.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use async_trait::async_trait;

use crate::config::OpenAiConfig;
use crate::error::ProviderError;

use super::types::{ChatProvider, ChatTurn, is_placeholder};

pub struct OpenAiProvider {
    client: Client,
    name: String,
    /// `None` for keyless compatible endpoints
    api_key: Option<String>,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    extra_headers: HashMap<String, String>,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self::with_endpoint(
            "openai",
            Some(config.api_key.clone()),
            config.endpoint.clone(),
            config.model.clone(),
            config.max_tokens,
            config.temperature,
            HashMap::new(),
        )
    }

    /// Low-level constructor shared with OpenAI-compatible endpoints
    pub(crate) fn with_endpoint(
        name: &str,
        api_key: Option<String>,
        endpoint: String,
        model: String,
        max_tokens: u32,
        temperature: f32,
        extra_headers: HashMap<String, String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            name: name.to_string(),
            api_key,
            endpoint,
            model,
            max_tokens,
            temperature,
            extra_headers,
        }
    }

    /// Shape the context window into the role-array wire format, system
    /// prompt as the leading message
    fn build_messages(turns: &[ChatTurn], system: &str) -> Vec<OpenAiMessage> {
        let mut messages = vec![OpenAiMessage {
            role: "system".to_string(),
            content: system.to_string(),
        }];
        for turn in turns {
            messages.push(OpenAiMessage {
                role: turn.sender.role().to_string(),
                content: turn.content.clone(),
            });
        }
        messages
    }

    fn extract_reply(&self, resp: OpenAiApiResponse) -> Result<String, ProviderError> {
        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| ProviderError::ResponseFormat {
                provider: self.name.clone(),
            })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ProviderError> {
        if let Some(key) = &self.api_key {
            if is_placeholder(key) {
                return Err(ProviderError::Configuration(format!(
                    "{} API key not configured. Add your key to the [{}] section of the config file",
                    self.name, self.name
                )));
            }
        }
        Ok(())
    }

    async fn chat(&self, turns: &[ChatTurn], system: &str) -> Result<String, ProviderError> {
        let messages = Self::build_messages(turns, system);

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": false,
        });

        debug!(
            "{} request: model={}, messages={}",
            self.name,
            self.model,
            messages.len()
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }
        for (header, value) in &self.extra_headers {
            request = request.header(header, value);
        }

        let response = request.send().await.map_err(|e| ProviderError::Network {
            provider: self.name.clone(),
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

        let api_response: OpenAiApiResponse =
            response.json().await.map_err(|e| ProviderError::Parse {
                provider: self.name.clone(),
                message: e.to_string(),
            })?;

        self.extract_reply(api_response)
    }
}

// ── OpenAI wire types ──

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiApiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(&OpenAiConfig {
            api_key: "sk-live-abc".to_string(),
            ..OpenAiConfig::default()
        })
    }

    #[test]
    fn test_build_messages_leads_with_system() {
        let turns = vec![ChatTurn::user("hello"), ChatTurn::assistant("hi there")];
        let messages = OpenAiProvider::build_messages(&turns, "You are helpful.");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "You are helpful.");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[2].content, "hi there");
    }

    #[test]
    fn test_extract_reply_trims() {
        let resp: OpenAiApiResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":" hi "}}]}"#).unwrap();
        assert_eq!(provider().extract_reply(resp).unwrap(), "hi");
    }

    #[test]
    fn test_extract_reply_no_choices() {
        let resp: OpenAiApiResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            provider().extract_reply(resp),
            Err(ProviderError::ResponseFormat { provider }) if provider == "openai"
        ));
    }

    #[test]
    fn test_extract_reply_null_content() {
        let resp: OpenAiApiResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            provider().extract_reply(resp),
            Err(ProviderError::ResponseFormat { .. })
        ));
    }

    #[test]
    fn test_validate_placeholder_key() {
        let p = OpenAiProvider::new(&OpenAiConfig::default());
        assert!(matches!(
            p.validate(),
            Err(ProviderError::Configuration(_))
        ));
        assert!(provider().validate().is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", provider());
        assert!(!debug.contains("sk-live-abc"));
    }
}
