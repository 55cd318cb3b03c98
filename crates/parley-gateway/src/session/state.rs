//! Session lifecycle states

/// Where the session is in its connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected and not trying to be
    Offline,
    /// Transport connect in flight, waiting for Hello
    Connecting,
    /// Hello received, Identify sent
    Identifying,
    /// Identified, waiting for the READY snapshot
    AwaitingReady,
    /// Live: store synced, events flowing
    Ready,
    /// Reconnected with a prior session, Resume sent
    Resuming,
}

impl SessionState {
    /// Whether gateway traffic is currently flowing
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Short name for logging
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Connecting => "connecting",
            Self::Identifying => "identifying",
            Self::AwaitingReady => "awaiting_ready",
            Self::Ready => "ready",
            Self::Resuming => "resuming",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_states() {
        assert!(SessionState::Ready.is_connected());
        assert!(!SessionState::Resuming.is_connected());
        assert!(!SessionState::Offline.is_connected());
        assert!(!SessionState::Identifying.is_connected());
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionState::AwaitingReady.to_string(), "awaiting_ready");
    }
}
