//! Permission overwrite - per-channel, per-subject allow/deny exception

use serde::{Deserialize, Serialize};

use crate::value_objects::{Permissions, Snowflake};

/// The kind of subject a permission overwrite targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwriteKind {
    Role,
    Member,
}

/// A per-channel permission exception for one role or member
///
/// Invariant: `allow & deny == 0`. Construction strips conflicting bits from
/// `deny` (allow wins, matching the role-overwrite combination rule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOverwrite", into = "RawOverwrite")]
pub struct PermissionOverwrite {
    /// The targeted role or user id
    pub id: Snowflake,
    pub kind: OverwriteKind,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl PermissionOverwrite {
    /// Create an overwrite, normalizing any bits present in both masks
    pub fn new(id: Snowflake, kind: OverwriteKind, allow: Permissions, deny: Permissions) -> Self {
        Self {
            id,
            kind,
            allow,
            deny: deny & !allow,
        }
    }

    /// Overwrite targeting a role
    pub fn role(id: Snowflake, allow: Permissions, deny: Permissions) -> Self {
        Self::new(id, OverwriteKind::Role, allow, deny)
    }

    /// Overwrite targeting a member
    pub fn member(id: Snowflake, allow: Permissions, deny: Permissions) -> Self {
        Self::new(id, OverwriteKind::Member, allow, deny)
    }
}

/// Wire shape: `{id, type, allow, deny}`
#[derive(Serialize, Deserialize)]
struct RawOverwrite {
    id: Snowflake,
    #[serde(rename = "type")]
    kind: OverwriteKind,
    #[serde(default)]
    allow: Permissions,
    #[serde(default)]
    deny: Permissions,
}

impl From<RawOverwrite> for PermissionOverwrite {
    fn from(raw: RawOverwrite) -> Self {
        PermissionOverwrite::new(raw.id, raw.kind, raw.allow, raw.deny)
    }
}

impl From<PermissionOverwrite> for RawOverwrite {
    fn from(ow: PermissionOverwrite) -> Self {
        RawOverwrite {
            id: ow.id,
            kind: ow.kind,
            allow: ow.allow,
            deny: ow.deny,
        }
    }
}
