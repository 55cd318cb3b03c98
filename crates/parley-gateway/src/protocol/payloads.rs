//! Gateway payload shapes
//!
//! Typed bodies for the `d` field of gateway frames. Entity decoding itself
//! is serde's job; these structs only describe how entities are wrapped and
//! nested on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use parley_core::{Channel, Guild, Member, Role, Snowflake, User};

/// Hello payload (op 10) - sent by the server on connect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Interval between client heartbeats, in milliseconds
    pub heartbeat_interval: u64,
}

/// Client platform properties sent with Identify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProperties {
    pub os: String,
    pub device: String,
}

impl Default for ClientProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            device: "parley".to_string(),
        }
    }
}

/// Identify payload (op 2) - authenticate a fresh session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub properties: ClientProperties,
    /// Capability flags negotiated with the server
    #[serde(default)]
    pub capabilities: u32,
}

/// Resume payload (op 6) - re-establish a dropped session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    pub token: String,
    pub session_id: String,
    pub seq: u64,
}

/// READY dispatch payload - the initial hydration snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    pub session_id: String,
    pub user: User,
    /// Guild payloads; may be `unavailable` stubs that need REST hydration
    #[serde(default)]
    pub guilds: Vec<Value>,
}

/// A guild dispatch body: the guild plus its nested children
///
/// Nested channels, roles, and members omit `guild_id` on the wire; callers
/// fill it in before anything reaches the store.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildData {
    #[serde(flatten)]
    pub guild: Guild,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub members: Vec<MemberData>,
    /// Set when the member list was truncated and needs REST hydration
    #[serde(default)]
    pub large: bool,
    #[serde(default)]
    pub member_count: Option<u32>,
}

/// A guild stub as it appears in READY before hydration
#[derive(Debug, Clone, Deserialize)]
pub struct GuildStub {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

/// GUILD_DELETE dispatch body
#[derive(Debug, Clone, Deserialize)]
pub struct GuildDeleteData {
    pub id: Snowflake,
    /// An unavailable guild went offline; it was not actually left
    #[serde(default)]
    pub unavailable: bool,
}

/// A member as nested in guild payloads and member dispatches
#[derive(Debug, Clone, Deserialize)]
pub struct MemberData {
    pub user: User,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub deaf: bool,
}

impl MemberData {
    /// Split into the global user and the guild-scoped member
    pub fn into_parts(self, guild_id: Snowflake) -> (User, Member) {
        let member = Member {
            guild_id,
            user_id: self.user.id,
            nickname: self.nick,
            joined_at: self.joined_at.unwrap_or_else(Utc::now),
            mute: self.mute,
            deaf: self.deaf,
            role_ids: self.roles,
        };
        (self.user, member)
    }
}

/// GUILD_MEMBER_ADD / GUILD_MEMBER_UPDATE dispatch body
#[derive(Debug, Clone, Deserialize)]
pub struct MemberEventData {
    pub guild_id: Snowflake,
    #[serde(flatten)]
    pub member: MemberData,
}

/// GUILD_MEMBER_REMOVE dispatch body
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRemoveData {
    pub guild_id: Snowflake,
    pub user: User,
}

/// GUILD_MEMBERS_CHUNK dispatch body (snapshot hydration)
#[derive(Debug, Clone, Deserialize)]
pub struct MemberChunkData {
    pub guild_id: Snowflake,
    #[serde(default)]
    pub members: Vec<MemberData>,
}

/// GUILD_ROLE_CREATE / GUILD_ROLE_UPDATE dispatch body
#[derive(Debug, Clone, Deserialize)]
pub struct RoleEventData {
    pub guild_id: Snowflake,
    pub role: Role,
}

/// GUILD_ROLE_DELETE dispatch body
#[derive(Debug, Clone, Deserialize)]
pub struct RoleDeleteData {
    pub guild_id: Snowflake,
    pub role_id: Snowflake,
}
