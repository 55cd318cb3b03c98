//! Channel entity - a text or voice channel within a guild

use serde::{Deserialize, Serialize};

use super::overwrite::PermissionOverwrite;
use crate::value_objects::Snowflake;

/// Kind-specific channel data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelKind {
    Text {
        topic: Option<String>,
    },
    Voice {
        /// Audio bitrate in bits per second
        bitrate: u32,
        /// Maximum members allowed in the channel; 0 means unlimited
        user_limit: u16,
    },
}

impl ChannelKind {
    /// Wire value for the channel `type` field
    #[inline]
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Text { .. } => 0,
            Self::Voice { .. } => 2,
        }
    }
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChannel", into = "RawChannel")]
pub struct Channel {
    pub id: Snowflake,
    /// Parent guild; zero when decoded from a payload nested inside a guild,
    /// filled in by the dispatcher before the channel reaches the store
    pub guild_id: Snowflake,
    pub name: String,
    /// Ordering index within the guild and kind
    pub position: i32,
    pub overwrites: Vec<PermissionOverwrite>,
    pub kind: ChannelKind,
}

impl Channel {
    /// Create a new text channel
    pub fn text(id: Snowflake, guild_id: Snowflake, name: String) -> Self {
        Self {
            id,
            guild_id,
            name,
            position: 0,
            overwrites: Vec::new(),
            kind: ChannelKind::Text { topic: None },
        }
    }

    /// Create a new voice channel
    pub fn voice(id: Snowflake, guild_id: Snowflake, name: String) -> Self {
        Self {
            id,
            guild_id,
            name,
            position: 0,
            overwrites: Vec::new(),
            kind: ChannelKind::Voice {
                bitrate: 64_000,
                user_limit: 0,
            },
        }
    }

    /// Check if this is a text channel
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ChannelKind::Text { .. })
    }

    /// Check if this is a voice channel
    #[inline]
    pub fn is_voice(&self) -> bool {
        matches!(self.kind, ChannelKind::Voice { .. })
    }

    /// The overwrite targeting the given subject id, if any
    pub fn overwrite_for(&self, id: Snowflake) -> Option<&PermissionOverwrite> {
        self.overwrites.iter().find(|ow| ow.id == id)
    }
}

/// Wire shape: flat object with a numeric `type` discriminant
#[derive(Serialize, Deserialize)]
struct RawChannel {
    id: Snowflake,
    #[serde(default)]
    guild_id: Snowflake,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    name: String,
    #[serde(default)]
    position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_limit: Option<u16>,
    #[serde(default)]
    permission_overwrites: Vec<PermissionOverwrite>,
}

impl TryFrom<RawChannel> for Channel {
    type Error = String;

    fn try_from(raw: RawChannel) -> Result<Self, Self::Error> {
        let kind = match raw.kind {
            0 => ChannelKind::Text { topic: raw.topic },
            2 => ChannelKind::Voice {
                bitrate: raw.bitrate.unwrap_or(64_000),
                user_limit: raw.user_limit.unwrap_or(0),
            },
            other => return Err(format!("unsupported channel type: {other}")),
        };
        Ok(Channel {
            id: raw.id,
            guild_id: raw.guild_id,
            name: raw.name,
            position: raw.position,
            overwrites: raw.permission_overwrites,
            kind,
        })
    }
}

impl From<Channel> for RawChannel {
    fn from(channel: Channel) -> Self {
        let (topic, bitrate, user_limit) = match &channel.kind {
            ChannelKind::Text { topic } => (topic.clone(), None, None),
            ChannelKind::Voice {
                bitrate,
                user_limit,
            } => (None, Some(*bitrate), Some(*user_limit)),
        };
        RawChannel {
            id: channel.id,
            guild_id: channel.guild_id,
            kind: channel.kind.as_u8(),
            name: channel.name,
            position: channel.position,
            topic,
            bitrate,
            user_limit,
            permission_overwrites: channel.overwrites,
        }
    }
}
