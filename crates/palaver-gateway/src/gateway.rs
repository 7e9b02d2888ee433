//! Provider gateway
//!
//! One immutable provider selection per gateway instance. Each call is a
//! stateless request/response: validate credentials, bound the history to
//! the configured window, hand the window to the provider, and surface
//! every failure as a typed [`ProviderError`]. At most one attempt per
//! call; retry policy belongs to the caller.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{ChatSettings, GatewayConfig};
use crate::error::ProviderError;
use crate::providers::types::{ChatProvider, ChatTurn};
use crate::providers::build_provider;

pub struct ProviderGateway {
    provider: Box<dyn ChatProvider>,
    settings: ChatSettings,
}

impl std::fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderGateway")
            .field("provider", &self.provider.provider_name())
            .field("max_history", &self.settings.max_history)
            .finish()
    }
}

impl ProviderGateway {
    /// Build a gateway for the provider named in `config`.
    ///
    /// Fails with [`ProviderError::Unsupported`] for an unknown provider
    /// identifier. Credential checks happen per send, not here, so a
    /// gateway can be constructed before keys are filled in.
    pub fn new(config: &GatewayConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            provider: build_provider(config)?,
            settings: config.chat.clone(),
        })
    }

    /// Build a gateway around an already-constructed provider
    pub fn with_provider(provider: Box<dyn ChatProvider>, settings: ChatSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Send a message with the configured per-request deadline
    pub async fn send_message(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, ProviderError> {
        self.provider.validate()?;
        let window = self.context_window(message, history);

        debug!(
            provider = self.provider.provider_name(),
            turns = window.len(),
            "sending message"
        );

        let seconds = self.settings.request_timeout_secs;
        let reply = tokio::time::timeout(
            Duration::from_secs(seconds),
            self.provider.chat(&window, &self.settings.system_prompt),
        )
        .await
        .map_err(|_| ProviderError::Timeout {
            provider: self.provider.provider_name().to_string(),
            seconds,
        })?;

        if let Err(e) = &reply {
            warn!(provider = self.provider.provider_name(), error = %e, "send failed");
        }
        reply
    }

    /// Like [`send_message`](Self::send_message), but also races a
    /// caller-supplied cancellation token
    pub async fn send_message_cancellable(
        &self,
        message: &str,
        history: &[ChatTurn],
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ProviderError::Cancelled {
                provider: self.provider.provider_name().to_string(),
            }),
            reply = self.send_message(message, history) => reply,
        }
    }

    /// Bound the history to the last `max_history` turns and append the
    /// current message as the final user turn
    fn context_window(&self, message: &str, history: &[ChatTurn]) -> Vec<ChatTurn> {
        let start = history.len().saturating_sub(self.settings.max_history);
        let mut window: Vec<ChatTurn> = history[start..].to_vec();
        window.push(ChatTurn::user(message));
        window
    }
}

/// Canned reply for when a real provider call has already failed.
///
/// Pure keyword check, no I/O, deliberately much smaller than the local
/// provider's bucket set.
pub fn fallback_response(message: &str) -> &'static str {
    let msg = message.to_lowercase();

    if msg.contains("hello") || msg.contains("hi") || msg.contains("hey") {
        "Hello! I'm having trouble connecting to my AI service right now, but I'm still \
         here to help! How can I assist you?"
    } else if msg.contains("help") {
        "I'm experiencing some technical difficulties with my AI service, but I can still \
         try to help! What do you need assistance with?"
    } else {
        "I'm sorry, I'm having trouble connecting to my AI service at the moment. Please \
         try again in a few moments, or check your internet connection."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::local::LocalProvider;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::{Arc, Mutex};

    /// Records the window it receives and echoes a fixed reply
    struct CaptureProvider {
        seen: Mutex<Vec<Vec<ChatTurn>>>,
    }

    impl CaptureProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatProvider for Arc<CaptureProvider> {
        fn provider_name(&self) -> &str {
            "capture"
        }

        async fn chat(&self, turns: &[ChatTurn], _system: &str) -> Result<String, ProviderError> {
            self.seen.lock().unwrap().push(turns.to_vec());
            Ok("ok".to_string())
        }
    }

    fn history_of(n: usize) -> Vec<ChatTurn> {
        (0..n).map(|i| ChatTurn::user(format!("turn {i}"))).collect()
    }

    fn settings(max_history: usize, timeout: u64) -> ChatSettings {
        ChatSettings {
            max_history,
            request_timeout_secs: timeout,
            ..ChatSettings::default()
        }
    }

    #[tokio::test]
    async fn test_window_keeps_last_max_history_turns() {
        let capture = CaptureProvider::new();
        let gateway =
            ProviderGateway::with_provider(Box::new(Arc::clone(&capture)), settings(10, 60));

        gateway
            .send_message("current", &history_of(15))
            .await
            .unwrap();

        let seen = capture.seen.lock().unwrap();
        let window = &seen[0];
        // last 10 history turns + the current message
        assert_eq!(window.len(), 11);
        assert_eq!(window[0].content, "turn 5");
        assert_eq!(window[9].content, "turn 14");
        assert_eq!(window[10].content, "current");
    }

    #[tokio::test]
    async fn test_window_short_history_passed_whole() {
        let capture = CaptureProvider::new();
        let gateway =
            ProviderGateway::with_provider(Box::new(Arc::clone(&capture)), settings(10, 60));

        gateway.send_message("current", &history_of(3)).await.unwrap();

        let seen = capture.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 4);
        assert_eq!(seen[0][0].content, "turn 0");
    }

    #[tokio::test]
    async fn test_placeholder_key_fails_without_network() {
        // Default config carries the YOUR_..._HERE placeholder
        let config = GatewayConfig {
            provider: "openai".to_string(),
            ..GatewayConfig::default()
        };
        let gateway = ProviderGateway::new(&config).unwrap();
        let err = gateway.send_message("hi", &[]).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.is_local());
    }

    #[test]
    fn test_unknown_provider_rejected_at_construction() {
        let config = GatewayConfig {
            provider: "hal9000".to_string(),
            ..GatewayConfig::default()
        };
        assert!(matches!(
            ProviderGateway::new(&config),
            Err(ProviderError::Unsupported(name)) if name == "hal9000"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let slow = LocalProvider::with_parts(
            Duration::from_secs(30),
            Arc::new(crate::providers::local::SystemClock),
            StdRng::seed_from_u64(0),
        );
        let gateway = ProviderGateway::with_provider(Box::new(slow), settings(10, 5));
        let err = gateway.send_message("hello", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Timeout { provider, seconds: 5 } if provider == "local"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_token_wins() {
        let slow = LocalProvider::with_parts(
            Duration::from_secs(30),
            Arc::new(crate::providers::local::SystemClock),
            StdRng::seed_from_u64(0),
        );
        let gateway = ProviderGateway::with_provider(Box::new(slow), settings(10, 60));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = gateway
            .send_message_cancellable("hello", &[], &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_local_provider_end_to_end() {
        let config = GatewayConfig {
            provider: "local".to_string(),
            local: crate::config::LocalConfig { response_delay_ms: 0 },
            ..GatewayConfig::default()
        };
        let gateway = ProviderGateway::new(&config).unwrap();
        let reply = gateway.send_message("what time is it", &[]).await.unwrap();
        assert!(reply.contains("current time"));
    }

    #[test]
    fn test_fallback_buckets() {
        assert!(fallback_response("hello there").contains("still here to help"));
        assert!(fallback_response("I need help").contains("technical difficulties"));
        assert!(fallback_response("what's for dinner").contains("try again in a few moments"));
    }

    #[test]
    fn test_fallback_is_pure() {
        let a = fallback_response("hello");
        let b = fallback_response("hello");
        assert_eq!(a, b);
    }
}
