//! RapidAPI ChatGPT proxy provider
//!
//! The proxy has shipped several response shapes over time, so reply
//! extraction probes a list of known field paths. A 403 whose body
//! mentions "not subscribed" means the key is valid but the account has
//! no active plan for this API; that case gets its own error variant with
//! a remediation hint.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use async_trait::async_trait;

use crate::config::RapidApiConfig;
use crate::error::ProviderError;

use super::types::{ChatProvider, ChatTurn, is_placeholder};

pub struct RapidApiProvider {
    client: Client,
    api_key: String,
    host: String,
    endpoint: String,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for RapidApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapidApiProvider")
            .field("host", &self.host)
            .field("endpoint", &self.endpoint)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl RapidApiProvider {
    pub fn new(config: &RapidApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: config.api_key.clone(),
            host: config.host.clone(),
            endpoint: config.endpoint.clone(),
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }

    fn build_messages(turns: &[ChatTurn]) -> Vec<RapidApiMessage> {
        turns
            .iter()
            .map(|turn| RapidApiMessage {
                role: turn.sender.role().to_string(),
                content: turn.content.clone(),
            })
            .collect()
    }

    /// Probe the known reply field paths in order
    fn extract_reply(&self, body: &Value) -> Result<String, ProviderError> {
        let candidates = [
            body.pointer("/choices/0/message/content"),
            body.get("content"),
            body.get("text"),
            body.get("result"),
        ];
        candidates
            .into_iter()
            .flatten()
            .find_map(Value::as_str)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| ProviderError::ResponseFormat {
                provider: "rapidapi".to_string(),
            })
    }

    fn classify_http_error(status: u16, body: String) -> ProviderError {
        if status == 403 && body.contains("not subscribed") {
            ProviderError::SubscriptionRequired(
                "You are not subscribed to this API on RapidAPI. Subscribe to the ChatGPT API \
                 at https://rapidapi.com/chatgpt-42/api/chatgpt-42, or switch to a different \
                 provider in the config file"
                    .to_string(),
            )
        } else {
            ProviderError::Http { status, body }
        }
    }
}

#[async_trait]
impl ChatProvider for RapidApiProvider {
    fn provider_name(&self) -> &str {
        "rapidapi"
    }

    fn validate(&self) -> Result<(), ProviderError> {
        if is_placeholder(&self.api_key) {
            return Err(ProviderError::Configuration(
                "RapidAPI key not configured. Add your key to the [rapidapi] section \
                 of the config file"
                    .to_string(),
            ));
        }
        Ok(())
    }

    async fn chat(&self, turns: &[ChatTurn], system: &str) -> Result<String, ProviderError> {
        let messages = Self::build_messages(turns);

        let body = serde_json::json!({
            "messages": messages,
            "system_prompt": system,
            "temperature": self.temperature,
            "top_k": self.top_k,
            "top_p": self.top_p,
            "image": "",
            "max_tokens": self.max_tokens,
        });

        debug!(
            "RapidAPI request: host={}, messages={}",
            self.host,
            messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                provider: "rapidapi".to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::classify_http_error(status.as_u16(), body));
        }

        let body: Value = response.json().await.map_err(|e| ProviderError::Parse {
            provider: "rapidapi".to_string(),
            message: e.to_string(),
        })?;

        self.extract_reply(&body)
    }
}

#[derive(Debug, Clone, Serialize)]
struct RapidApiMessage {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> RapidApiProvider {
        RapidApiProvider::new(&RapidApiConfig {
            api_key: "rapid-live-key".to_string(),
            ..RapidApiConfig::default()
        })
    }

    #[test]
    fn test_build_messages_roles() {
        let turns = vec![ChatTurn::user("hello"), ChatTurn::assistant("hi")];
        let messages = RapidApiProvider::build_messages(&turns);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
    }

    #[test]
    fn test_extract_reply_choices_shape() {
        let body: Value =
            serde_json::from_str(r#"{"choices":[{"message":{"content":" hi "}}]}"#).unwrap();
        assert_eq!(provider().extract_reply(&body).unwrap(), "hi");
    }

    #[test]
    fn test_extract_reply_flat_shapes() {
        let p = provider();
        let body: Value = serde_json::from_str(r#"{"content":"from content"}"#).unwrap();
        assert_eq!(p.extract_reply(&body).unwrap(), "from content");
        let body: Value = serde_json::from_str(r#"{"text":" from text "}"#).unwrap();
        assert_eq!(p.extract_reply(&body).unwrap(), "from text");
        let body: Value = serde_json::from_str(r#"{"result":"from result"}"#).unwrap();
        assert_eq!(p.extract_reply(&body).unwrap(), "from result");
    }

    #[test]
    fn test_extract_reply_prefers_choices() {
        let body: Value = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"winner"}}],"text":"loser"}"#,
        )
        .unwrap();
        assert_eq!(provider().extract_reply(&body).unwrap(), "winner");
    }

    #[test]
    fn test_extract_reply_unknown_shape() {
        let body: Value = serde_json::from_str(r#"{"something":"else"}"#).unwrap();
        assert!(matches!(
            provider().extract_reply(&body),
            Err(ProviderError::ResponseFormat { provider }) if provider == "rapidapi"
        ));
    }

    #[test]
    fn test_403_not_subscribed_classified() {
        let err = RapidApiProvider::classify_http_error(
            403,
            r#"{"message":"You are not subscribed to this API."}"#.to_string(),
        );
        assert!(matches!(err, ProviderError::SubscriptionRequired(msg) if msg.contains("rapidapi.com")));
    }

    #[test]
    fn test_403_other_body_stays_http() {
        let err = RapidApiProvider::classify_http_error(403, "forbidden".to_string());
        assert!(matches!(err, ProviderError::Http { status: 403, .. }));
    }

    #[test]
    fn test_500_stays_http() {
        let err = RapidApiProvider::classify_http_error(500, "not subscribed".to_string());
        assert!(matches!(err, ProviderError::Http { status: 500, .. }));
    }

    #[test]
    fn test_validate_placeholder_key() {
        let p = RapidApiProvider::new(&RapidApiConfig::default());
        assert!(matches!(p.validate(), Err(ProviderError::Configuration(_))));
        assert!(provider().validate().is_ok());
    }
}
