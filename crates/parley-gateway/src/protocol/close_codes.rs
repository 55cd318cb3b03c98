//! Gateway close codes
//!
//! WebSocket close codes sent by the server, classified by what the client
//! should do next: resume, re-identify, or give up.

/// Gateway close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    /// Unknown error, try to resume
    UnknownError = 4000,
    /// An invalid op code was sent
    UnknownOpCode = 4001,
    /// An invalid payload was sent
    DecodeError = 4002,
    /// A payload was sent before identifying
    NotAuthenticated = 4003,
    /// The credential in Identify was invalid
    AuthenticationFailed = 4004,
    /// Identify was sent twice on one connection
    AlreadyAuthenticated = 4005,
    /// The sequence sent with Resume was invalid
    InvalidSequence = 4007,
    /// Payloads were sent too quickly
    RateLimited = 4008,
    /// The session timed out
    SessionTimeout = 4009,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw close code value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownOpCode),
            4002 => Some(Self::DecodeError),
            4003 => Some(Self::NotAuthenticated),
            4004 => Some(Self::AuthenticationFailed),
            4005 => Some(Self::AlreadyAuthenticated),
            4007 => Some(Self::InvalidSequence),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimeout),
            _ => None,
        }
    }

    /// Get the raw close code value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether the session may be resumed after this close
    ///
    /// Invalid sequence and session timeout invalidate the session state;
    /// the client must re-identify from scratch.
    #[must_use]
    pub const fn can_resume(self) -> bool {
        !matches!(
            self,
            Self::AuthenticationFailed | Self::InvalidSequence | Self::SessionTimeout
        )
    }

    /// Whether this close is fatal and must not be retried
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }

    /// Get a human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error",
            Self::UnknownOpCode => "Unknown op code",
            Self::DecodeError => "Decode error",
            Self::NotAuthenticated => "Not authenticated",
            Self::AuthenticationFailed => "Authentication failed",
            Self::AlreadyAuthenticated => "Already authenticated",
            Self::InvalidSequence => "Invalid sequence",
            Self::RateLimited => "Rate limited",
            Self::SessionTimeout => "Session timed out",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}
