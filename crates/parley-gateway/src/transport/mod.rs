//! Frame transport abstraction
//!
//! `GatewaySession` speaks to the wire through `FrameTransport`, so tests can
//! script a session without a socket. The production implementation lives in
//! [`websocket`].

mod websocket;

use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::{CloseCode, GatewayFrame};

pub use websocket::WebSocketConnector;

/// Transport layer errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish the connection
    #[error("connection failed: {0}")]
    Connect(String),

    /// The socket failed mid-connection
    #[error("socket error: {0}")]
    Io(String),

    /// The peer closed the connection
    #[error("connection closed by peer (code: {code:?})")]
    Closed { code: Option<u16> },

    /// A frame arrived that could not be decoded; the caller may skip it and
    /// keep reading
    #[error("malformed frame: {0}")]
    Decode(String),
}

impl TransportError {
    /// The gateway close code carried by a `Closed` error, when recognized
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Self::Closed { code: Some(code) } => CloseCode::from_u16(*code),
            _ => None,
        }
    }

    /// Malformed-frame errors are protocol noise, not connection failures
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// A bidirectional, already-connected gateway frame stream
#[async_trait]
pub trait FrameTransport: Send {
    /// Receive the next frame; `Ok(None)` means the peer closed cleanly
    async fn next_frame(&mut self) -> Result<Option<GatewayFrame>, TransportError>;

    /// Send a frame to the peer
    async fn send_frame(&mut self, frame: &GatewayFrame) -> Result<(), TransportError>;

    /// Close the connection; safe to call on an already-closed transport
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens fresh transports for connect and reconnect attempts
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn FrameTransport>, TransportError>;
}
