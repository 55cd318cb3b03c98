//! Member entity - a user scoped to one guild

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Guild member entity (junction between User and Guild)
///
/// Keyed by `(guild_id, user_id)`. The role list implicitly includes the
/// guild's everyone role; the resolver accounts for it whether or not it is
/// listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub nickname: Option<String>,
    pub joined_at: DateTime<Utc>,
    /// Server-muted in voice channels
    pub mute: bool,
    /// Server-deafened in voice channels
    pub deaf: bool,
    pub role_ids: Vec<Snowflake>,
}

impl Member {
    /// Create a new Member
    pub fn new(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            guild_id,
            user_id,
            nickname: None,
            joined_at: Utc::now(),
            mute: false,
            deaf: false,
            role_ids: Vec::new(),
        }
    }

    /// Get display name (nickname if set, otherwise fallback)
    pub fn display_name<'a>(&'a self, username: &'a str) -> &'a str {
        self.nickname.as_deref().unwrap_or(username)
    }

    /// Check if member holds a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        // The everyone role is held implicitly
        role_id == self.guild_id || self.role_ids.contains(&role_id)
    }

    /// Add a role to the member
    pub fn add_role(&mut self, role_id: Snowflake) {
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
        }
    }

    /// Remove a role from the member
    pub fn remove_role(&mut self, role_id: Snowflake) {
        self.role_ids.retain(|&id| id != role_id);
    }
}
