//! Typed failure taxonomy for the provider gateway
//!
//! Every failure a provider call can produce is classified into one
//! [`ProviderError`] variant; raw transport or JSON errors never escape
//! the gateway boundary.

use thiserror::Error;

/// Classified failure from a gateway call
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A required credential or endpoint is missing or still a placeholder.
    /// Raised before any network call is made.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider answered with a non-success HTTP status
    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// RapidAPI 403 with a "not subscribed" body — the key is valid but
    /// the account is not subscribed to the API plan
    #[error("subscription required: {0}")]
    SubscriptionRequired(String),

    /// The provider answered 2xx but the reply field was absent
    #[error("unexpected response format from {provider}")]
    ResponseFormat { provider: String },

    /// The response body was not valid JSON
    #[error("failed to parse {provider} response: {message}")]
    Parse { provider: String, message: String },

    /// The request exceeded the configured deadline
    #[error("request to {provider} timed out after {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    /// The caller cancelled the request via its cancellation token
    #[error("request to {provider} was cancelled")]
    Cancelled { provider: String },

    /// Transport-level failure before any HTTP status was received
    #[error("network error talking to {provider}: {message}")]
    Network { provider: String, message: String },

    /// The configured provider identifier is not recognized
    #[error("unsupported provider: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// Whether this failure was raised without ever touching the network
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Unsupported(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ProviderError::Http {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "provider returned HTTP 429: rate limited");

        let err = ProviderError::Unsupported("gpt9".to_string());
        assert_eq!(err.to_string(), "unsupported provider: gpt9");
    }

    #[test]
    fn test_is_local() {
        assert!(ProviderError::Configuration("no key".to_string()).is_local());
        assert!(ProviderError::Unsupported("x".to_string()).is_local());
        assert!(
            !ProviderError::Http {
                status: 500,
                body: String::new()
            }
            .is_local()
        );
    }
}
