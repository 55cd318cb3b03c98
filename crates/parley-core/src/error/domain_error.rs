//! Domain errors - typed failures surfaced to application code

use thiserror::Error;

use crate::value_objects::{Permissions, Snowflake};

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("guild not found: {0}")]
    GuildNotFound(Snowflake),

    #[error("channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("role not found: {0}")]
    RoleNotFound(Snowflake),

    #[error("member {user_id} not found in guild {guild_id}")]
    MemberNotFound {
        guild_id: Snowflake,
        user_id: Snowflake,
    },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    /// A protected operation was attempted without the required permissions.
    /// Carries exactly the bits that were required but absent.
    #[error("missing permissions: {missing}")]
    MissingPermissions { missing: Permissions },

    /// A hierarchy check failed: the actor's highest role does not outrank
    /// the target (ties always deny).
    #[error("role hierarchy denies acting on the target")]
    HierarchyDenied,
}

impl DomainError {
    /// The missing permission bits, when this is a permission denial
    pub fn missing_permissions(&self) -> Option<Permissions> {
        match self {
            Self::MissingPermissions { missing } => Some(*missing),
            _ => None,
        }
    }
}
