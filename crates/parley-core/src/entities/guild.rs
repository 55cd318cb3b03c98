//! Guild entity - a server owning channels, roles, and members

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Member screening level required to participate in a guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum VerificationLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    VeryHigh,
    /// Unrecognized wire value, preserved for round-tripping
    Unknown(u8),
}

impl From<u8> for VerificationLevel {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            4 => Self::VeryHigh,
            other => Self::Unknown(other),
        }
    }
}

impl From<VerificationLevel> for u8 {
    fn from(level: VerificationLevel) -> Self {
        match level {
            VerificationLevel::None => 0,
            VerificationLevel::Low => 1,
            VerificationLevel::Medium => 2,
            VerificationLevel::High => 3,
            VerificationLevel::VeryHigh => 4,
            VerificationLevel::Unknown(other) => other,
        }
    }
}

/// Default message notification setting for a guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum NotificationLevel {
    #[default]
    AllMessages,
    OnlyMentions,
    /// Unrecognized wire value, preserved for round-tripping
    Unknown(u8),
}

impl From<u8> for NotificationLevel {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::AllMessages,
            1 => Self::OnlyMentions,
            other => Self::Unknown(other),
        }
    }
}

impl From<NotificationLevel> for u8 {
    fn from(level: NotificationLevel) -> Self {
        match level {
            NotificationLevel::AllMessages => 0,
            NotificationLevel::OnlyMentions => 1,
            NotificationLevel::Unknown(other) => other,
        }
    }
}

/// Guild (server) entity
///
/// Channels, roles, and members belonging to the guild are stored separately
/// in the `EntityStore`, keyed by `guild_id`; deleting a guild cascades to
/// all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub owner_id: Snowflake,
    #[serde(default)]
    pub afk_channel_id: Option<Snowflake>,
    /// AFK timeout in seconds
    #[serde(default)]
    pub afk_timeout: u32,
    #[serde(default)]
    pub verification_level: VerificationLevel,
    #[serde(default, rename = "default_message_notifications")]
    pub notification_level: NotificationLevel,
}

impl Guild {
    /// Create a new Guild
    pub fn new(id: Snowflake, name: String, owner_id: Snowflake) -> Self {
        Self {
            id,
            name,
            icon: None,
            region: None,
            owner_id,
            afk_channel_id: None,
            afk_timeout: 0,
            verification_level: VerificationLevel::None,
            notification_level: NotificationLevel::AllMessages,
        }
    }

    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    /// The id of the implicit everyone role (always equal to the guild id)
    #[inline]
    pub fn everyone_role_id(&self) -> Snowflake {
        self.id
    }
}
