//! # parley-gateway
//!
//! Resilient gateway client: WebSocket transport, session lifecycle with
//! resume and reconnect, dispatch-to-event pipeline, and REST hydration.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod rest;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use config::{GatewayConfig, ReconnectConfig};
pub use dispatch::{EventDispatcher, HydrationNeed};
pub use error::GatewayError;
pub use session::{GatewaySession, SessionHandle, SessionState};
