//! Permissions bitflags for guild access control
//!
//! A 64-bit integer bitfield carried by roles and channel overwrites.
//! Serialized as a decimal string in JSON for JavaScript safety.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Permission flags for guild-scoped access control
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// Create invites for the guild
        const CREATE_INSTANT_INVITE = 1 << 0;
        /// Kick members from the guild
        const KICK_MEMBERS          = 1 << 1;
        /// Ban members from the guild
        const BAN_MEMBERS           = 1 << 2;
        /// Bypass all permission checks
        const ADMINISTRATOR         = 1 << 3;
        /// Create, edit, delete channels
        const MANAGE_CHANNELS       = 1 << 4;
        /// Edit guild settings
        const MANAGE_GUILD          = 1 << 5;
        /// Add emoji reactions
        const ADD_REACTIONS         = 1 << 6;
        /// View channel and read message history
        const VIEW_CHANNEL          = 1 << 10;
        /// Send messages in text channels
        const SEND_MESSAGES         = 1 << 11;
        /// Delete other users' messages
        const MANAGE_MESSAGES       = 1 << 13;
        /// Upload files and images
        const ATTACH_FILES          = 1 << 15;
        /// Mention everyone and all roles
        const MENTION_EVERYONE      = 1 << 17;
        /// Join voice channels
        const CONNECT               = 1 << 20;
        /// Speak in voice channels
        const SPEAK                 = 1 << 21;
        /// Server-mute members in voice channels
        const MUTE_MEMBERS          = 1 << 22;
        /// Server-deafen members in voice channels
        const DEAFEN_MEMBERS        = 1 << 23;
        /// Move members between voice channels
        const MOVE_MEMBERS          = 1 << 24;
        /// Change own nickname
        const CHANGE_NICKNAME       = 1 << 26;
        /// Change other members' nicknames
        const MANAGE_NICKNAMES      = 1 << 27;
        /// Create, edit, delete, assign roles
        const MANAGE_ROLES          = 1 << 28;

        /// Default permissions for the everyone role
        const DEFAULT = Self::CREATE_INSTANT_INVITE.bits()
            | Self::ADD_REACTIONS.bits()
            | Self::VIEW_CHANNEL.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::ATTACH_FILES.bits()
            | Self::CONNECT.bits()
            | Self::SPEAK.bits()
            | Self::CHANGE_NICKNAME.bits();
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Check if the permission set has any of the given permissions
    #[inline]
    pub fn has_any(&self, permissions: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.intersects(permissions)
    }

    /// Combine permissions from multiple roles
    pub fn combine<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Permissions>,
    {
        roles.into_iter().fold(Permissions::empty(), |acc, p| acc | p)
    }

    /// The permission bits in `required` that are absent from this set
    #[inline]
    pub fn missing(&self, required: Permissions) -> Permissions {
        if self.contains(Permissions::ADMINISTRATOR) {
            return Permissions::empty();
        }
        required & !*self
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_truncate)
    }

    /// Get a list of the names of all individual permissions that are set
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

// Deserialize from string or number; unknown bits are dropped
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl<'de> Visitor<'de> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer permission bitfield")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(Permissions::from_bits_truncate)
                    .map_err(|_| de::Error::custom("negative permission bitfield"))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Permissions::parse(value)
                    .map_err(|_| de::Error::custom("invalid permission bitfield string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}
