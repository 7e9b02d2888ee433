//! Provider-agnostic types shared by every backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// One exchanged message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::Assistant,
            timestamp: Utc::now(),
        }
    }
}

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Wire role string used by the role-array providers
    pub fn role(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Turn label used by the flattened-transcript providers
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.role())
    }
}

/// Trait that all chat backends implement
///
/// Each provider owns its own wire format: it shapes the bounded context
/// window into a request body, issues at most one HTTP POST, and extracts
/// the reply text or classifies the failure. The `local` backend is the
/// one implementation that never touches the network.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider identifier (e.g. "openai", "anthropic", "local")
    fn provider_name(&self) -> &str;

    /// Fail fast when a required credential or endpoint is missing or
    /// still a placeholder. Called before every send; must not do I/O.
    fn validate(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Send the context window and return the extracted, trimmed reply.
    ///
    /// `turns` is the bounded window in conversation order, the current
    /// user message last. `system` is the shared system prompt.
    async fn chat(&self, turns: &[ChatTurn], system: &str) -> Result<String, ProviderError>;
}

/// Whether a configured value is usable, i.e. present and not one of the
/// `YOUR_..._HERE` sentinels shipped in the default config
pub(crate) fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || (v.starts_with("YOUR_") && (v.ends_with("_HERE") || v.ends_with("_ENDPOINT")))
}
