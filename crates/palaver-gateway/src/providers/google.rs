//! Google Gemini provider
//!
//! Gemini gets the conversation as one flattened text blob with
//! `User:`/`Assistant:` turn labels, the system prompt prepended as plain
//! text. The API key travels in the query string.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use async_trait::async_trait;

use crate::config::GoogleConfig;
use crate::error::ProviderError;

use super::types::{ChatProvider, ChatTurn, is_placeholder};

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GoogleProvider {
    pub fn new(config: &GoogleConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Flatten the context window into a single labelled transcript
    fn build_transcript(turns: &[ChatTurn], system: &str) -> String {
        let mut transcript = format!("{system}\n\n");
        for (i, turn) in turns.iter().enumerate() {
            transcript.push_str(turn.sender.label());
            transcript.push_str(": ");
            transcript.push_str(&turn.content);
            if i + 1 < turns.len() {
                transcript.push('\n');
            }
        }
        transcript
    }

    fn extract_reply(&self, resp: GeminiApiResponse) -> Result<String, ProviderError> {
        resp.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| ProviderError::ResponseFormat {
                provider: "google".to_string(),
            })
    }
}

#[async_trait]
impl ChatProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn validate(&self) -> Result<(), ProviderError> {
        if is_placeholder(&self.api_key) {
            return Err(ProviderError::Configuration(
                "Google API key not configured. Add your key to the [google] section \
                 of the config file"
                    .to_string(),
            ));
        }
        Ok(())
    }

    async fn chat(&self, turns: &[ChatTurn], system: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let transcript = Self::build_transcript(turns, system);

        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": transcript }]
            }],
            "generationConfig": {
                "maxOutputTokens": self.max_tokens,
                "temperature": 0.7,
            },
        });

        debug!(
            "Gemini request: model={}, transcript_len={}",
            self.model,
            transcript.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                provider: "google".to_string(),
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

        let api_response: GeminiApiResponse =
            response.json().await.map_err(|e| ProviderError::Parse {
                provider: "google".to_string(),
                message: e.to_string(),
            })?;

        self.extract_reply(api_response)
    }
}

// ── Gemini wire types ──

#[derive(Debug, Clone, Deserialize)]
struct GeminiApiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiPart {
    text: String,
}
