//! Gateway error taxonomy

use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by the gateway session
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The server rejected the credential; never retried
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server violated the expected protocol flow
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// All reconnect attempts were exhausted
    #[error("reconnect attempts exhausted after {attempts} tries")]
    ReconnectExhausted { attempts: u32 },
}

impl GatewayError {
    /// Whether reconnecting could succeed; auth rejections and exhausted
    /// retry budgets are terminal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Auth(_) | Self::ReconnectExhausted { .. })
    }
}
