//! Session lifecycle: connect, identify/resume, heartbeat, reconnect

mod backoff;
mod heartbeat;
mod session;
mod state;

pub use session::{GatewaySession, SessionHandle, SessionShared};
pub use state::SessionState;
