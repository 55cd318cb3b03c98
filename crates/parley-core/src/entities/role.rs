//! Role entity - a guild role carrying a permission mask and hierarchy rank

use serde::{Deserialize, Serialize};

use crate::value_objects::{Permissions, Snowflake};

/// Role entity
///
/// Higher `position` means higher authority. The implicit everyone role has
/// `id == guild_id` and sits at position 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Snowflake,
    /// Parent guild; zero when decoded from a payload nested inside a guild,
    /// filled in by the dispatcher before the role reaches the store
    #[serde(default)]
    pub guild_id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default, rename = "hoist")]
    pub hoisted: bool,
    #[serde(default)]
    pub mentionable: bool,
}

impl Role {
    /// Create a new Role
    pub fn new(id: Snowflake, guild_id: Snowflake, name: String, permissions: Permissions) -> Self {
        Self {
            id,
            guild_id,
            name,
            color: 0,
            position: 0,
            permissions,
            hoisted: false,
            mentionable: false,
        }
    }

    /// Create the implicit everyone role for a guild
    pub fn everyone(guild_id: Snowflake) -> Self {
        Self {
            id: guild_id,
            guild_id,
            name: "@everyone".to_string(),
            color: 0,
            position: 0,
            permissions: Permissions::DEFAULT,
            hoisted: false,
            mentionable: false,
        }
    }

    /// Check if this is the everyone role of its guild
    #[inline]
    pub fn is_everyone(&self) -> bool {
        self.id == self.guild_id
    }

    /// Check if this role grants a specific permission
    #[inline]
    pub fn has_permission(&self, permission: Permissions) -> bool {
        self.permissions.has(permission)
    }
}
