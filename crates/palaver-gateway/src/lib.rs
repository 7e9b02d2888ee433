//! palaver-gateway - Provider abstraction for chat assistant backends
//!
//! This crate provides:
//! - One uniform `send_message(message, history) -> reply text` contract
//!   mapped onto nine structurally incompatible chat APIs
//! - Per-provider request shaping, reply normalization, and typed error
//!   classification
//! - A local/offline responder that synthesizes replies from keyword rules
//! - A pure fallback responder for when a real provider call has failed
//! - Per-request timeout and caller-supplied cancellation

pub mod config;
pub mod error;
pub mod gateway;
pub mod providers;

// Re-export main types for convenience
pub use config::{ChatSettings, GatewayConfig};
pub use error::ProviderError;
pub use gateway::{ProviderGateway, fallback_response};
pub use providers::{ChatProvider, ChatTurn, Sender, build_provider};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Just verify that the main types are exported
        let _ = std::mem::size_of::<GatewayConfig>();
        let _ = std::mem::size_of::<ChatTurn>();
        let _ = std::mem::size_of::<ProviderGateway>();
        let _ = fallback_response("hello");
    }
}
