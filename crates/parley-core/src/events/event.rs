//! Event types - ordered, diffed domain events delivered to listeners
//!
//! Update dispatches are diffed field group by field group; each group that
//! actually changed produces one `*Update` event carrying the old and new
//! values, so listeners see precisely what moved and nothing else.

use crate::entities::{
    Channel, Guild, Member, NotificationLevel, PermissionOverwrite, Role, VerificationLevel,
};
use crate::value_objects::{Permissions, Snowflake};

/// A domain event, ordered by originating dispatch sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // =========================================================================
    // Session Events
    // =========================================================================
    /// Initial hydration finished; the store mirrors the remote snapshot
    Ready { session_id: String },
    /// A dropped session was resumed without losing events
    Resumed,

    // =========================================================================
    // Guild Events
    // =========================================================================
    GuildCreate(Guild),
    GuildUpdate {
        guild_id: Snowflake,
        change: GuildChange,
    },
    GuildDelete(Guild),

    // =========================================================================
    // Channel Events
    // =========================================================================
    ChannelCreate(Channel),
    ChannelUpdate {
        channel_id: Snowflake,
        change: ChannelChange,
    },
    ChannelDelete(Channel),

    // =========================================================================
    // Role Events
    // =========================================================================
    RoleCreate(Role),
    RoleUpdate {
        guild_id: Snowflake,
        role_id: Snowflake,
        change: RoleChange,
    },
    RoleDelete(Role),

    // =========================================================================
    // Member Events
    // =========================================================================
    MemberJoin(Member),
    MemberUpdate {
        guild_id: Snowflake,
        user_id: Snowflake,
        change: MemberChange,
    },
    MemberLeave(Member),

    // =========================================================================
    // User Events
    // =========================================================================
    UserUpdate {
        user_id: Snowflake,
        change: UserChange,
    },
}

/// A changed guild field group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuildChange {
    Name { old: String, new: String },
    Icon { old: Option<String>, new: Option<String> },
    Region { old: Option<String>, new: Option<String> },
    Owner { old: Snowflake, new: Snowflake },
    AfkChannel { old: Option<Snowflake>, new: Option<Snowflake> },
    AfkTimeout { old: u32, new: u32 },
    Verification { old: VerificationLevel, new: VerificationLevel },
    Notification { old: NotificationLevel, new: NotificationLevel },
}

/// A changed channel field group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelChange {
    Name { old: String, new: String },
    Position { old: i32, new: i32 },
    Topic { old: Option<String>, new: Option<String> },
    Bitrate { old: u32, new: u32 },
    UserLimit { old: u16, new: u16 },
    Overwrites {
        old: Vec<PermissionOverwrite>,
        new: Vec<PermissionOverwrite>,
    },
}

/// A changed role field group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    Name { old: String, new: String },
    Color { old: u32, new: u32 },
    Position { old: i32, new: i32 },
    Permissions { old: Permissions, new: Permissions },
    Hoisted { old: bool, new: bool },
    Mentionable { old: bool, new: bool },
}

/// A changed member field group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberChange {
    Nickname { old: Option<String>, new: Option<String> },
    Roles { old: Vec<Snowflake>, new: Vec<Snowflake> },
    Mute { old: bool, new: bool },
    Deaf { old: bool, new: bool },
}

/// A changed user field group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserChange {
    Username { old: String, new: String },
    Discriminator { old: String, new: String },
    Avatar { old: Option<String>, new: Option<String> },
}

impl Event {
    /// Short name of the event kind, for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "Ready",
            Self::Resumed => "Resumed",
            Self::GuildCreate(_) => "GuildCreate",
            Self::GuildUpdate { .. } => "GuildUpdate",
            Self::GuildDelete(_) => "GuildDelete",
            Self::ChannelCreate(_) => "ChannelCreate",
            Self::ChannelUpdate { .. } => "ChannelUpdate",
            Self::ChannelDelete(_) => "ChannelDelete",
            Self::RoleCreate(_) => "RoleCreate",
            Self::RoleUpdate { .. } => "RoleUpdate",
            Self::RoleDelete(_) => "RoleDelete",
            Self::MemberJoin(_) => "MemberJoin",
            Self::MemberUpdate { .. } => "MemberUpdate",
            Self::MemberLeave(_) => "MemberLeave",
            Self::UserUpdate { .. } => "UserUpdate",
        }
    }
}
