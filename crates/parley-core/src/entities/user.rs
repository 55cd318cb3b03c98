//! User entity - global identity, independent of any guild

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A platform user account
///
/// Users exist globally; a user seen only as a DM correspondent has no
/// associated `Member` in any guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub webhook: bool,
    #[serde(default)]
    pub verified: bool,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, username: String, discriminator: String) -> Self {
        Self {
            id,
            username,
            discriminator,
            avatar: None,
            bot: false,
            webhook: false,
            verified: false,
        }
    }

    /// Get the full tag: username#discriminator
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }

    /// Check if this user is an automated account (bot or webhook)
    #[inline]
    pub fn is_automated(&self) -> bool {
        self.bot || self.webhook
    }
}
