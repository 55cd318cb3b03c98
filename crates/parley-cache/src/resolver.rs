//! Permission resolver - pure permission math over store snapshots
//!
//! Resolution order for a member in a channel:
//! 1. base mask = everyone role | every held role; guild owner or
//!    ADMINISTRATOR short-circuits to all permissions
//! 2. role overwrites on the channel matching held roles: all matched denies
//!    applied first, then all matched allows (allow wins across the set)
//! 3. a member overwrite overrides the role-derived outcome per bit

use parley_core::{DomainError, Guild, Member, OverwriteKind, Permissions, Snowflake};

use crate::store::EntityStore;

/// Stateless permission resolution over an `EntityStore`
pub struct PermissionResolver<'a> {
    store: &'a EntityStore,
}

impl<'a> PermissionResolver<'a> {
    /// Create a resolver borrowing the given store
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Guild-wide base permissions for a member (no channel overwrites)
    pub fn base_permissions(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Permissions, DomainError> {
        let guild = self.require_guild(guild_id)?;
        if guild.is_owner(user_id) {
            return Ok(Permissions::all());
        }
        self.require_member(guild_id, user_id)?;

        let base = Permissions::combine(
            self.store
                .member_roles(guild_id, user_id)
                .iter()
                .map(|r| r.permissions),
        );
        if base.contains(Permissions::ADMINISTRATOR) {
            return Ok(Permissions::all());
        }
        Ok(base)
    }

    /// Effective permissions for a member in a channel, overwrites applied
    pub fn effective_permissions(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Permissions, DomainError> {
        let channel = self
            .store
            .channel(channel_id)
            .ok_or(DomainError::ChannelNotFound(channel_id))?;
        let guild_id = channel.guild_id;

        let base = self.base_permissions(guild_id, user_id)?;
        // Owner/administrator bypasses every overwrite
        if base == Permissions::all() {
            return Ok(base);
        }

        let member = self.require_member(guild_id, user_id)?;

        let mut role_allow = Permissions::empty();
        let mut role_deny = Permissions::empty();
        let mut member_allow = Permissions::empty();
        let mut member_deny = Permissions::empty();

        for ow in &channel.overwrites {
            match ow.kind {
                OverwriteKind::Role if member.has_role(ow.id) => {
                    role_allow |= ow.allow;
                    role_deny |= ow.deny;
                }
                OverwriteKind::Member if ow.id == user_id => {
                    member_allow |= ow.allow;
                    member_deny |= ow.deny;
                }
                _ => {}
            }
        }

        // Deny first, then allow: allow wins among role overwrites
        let mut perms = (base & !role_deny) | role_allow;
        // Member-level decisions win both directions
        perms = (perms & !member_deny) | member_allow;
        Ok(perms)
    }

    /// Effective permissions a single role grants in a channel
    pub fn role_permissions(
        &self,
        channel_id: Snowflake,
        role_id: Snowflake,
    ) -> Result<Permissions, DomainError> {
        let channel = self
            .store
            .channel(channel_id)
            .ok_or(DomainError::ChannelNotFound(channel_id))?;
        let role = self
            .store
            .role(role_id)
            .ok_or(DomainError::RoleNotFound(role_id))?;

        let everyone = self.store.role(channel.guild_id);
        let mut base = role.permissions;
        if let Some(everyone) = &everyone {
            base |= everyone.permissions;
        }
        if base.contains(Permissions::ADMINISTRATOR) {
            return Ok(Permissions::all());
        }

        let mut allow = Permissions::empty();
        let mut deny = Permissions::empty();
        for ow in &channel.overwrites {
            if ow.kind == OverwriteKind::Role && (ow.id == role_id || ow.id == channel.guild_id) {
                allow |= ow.allow;
                deny |= ow.deny;
            }
        }
        Ok((base & !deny) | allow)
    }

    /// Check that every required bit is present in the effective mask
    pub fn has_permission(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        required: Permissions,
    ) -> Result<bool, DomainError> {
        let effective = self.effective_permissions(channel_id, user_id)?;
        Ok(effective.contains(required))
    }

    /// Check a permission, surfacing the missing bits as a typed error
    pub fn require_permission(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        required: Permissions,
    ) -> Result<(), DomainError> {
        let effective = self.effective_permissions(channel_id, user_id)?;
        let missing = effective.missing(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::MissingPermissions { missing })
        }
    }

    // =========================================================================
    // Hierarchy checks
    // =========================================================================

    /// The highest role position a member holds (0 with no roles beyond
    /// everyone)
    pub fn highest_role_position(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<i32, DomainError> {
        self.require_member(guild_id, user_id)?;
        Ok(self
            .store
            .member_roles(guild_id, user_id)
            .iter()
            .map(|r| r.position)
            .max()
            .unwrap_or(0))
    }

    /// Check if an actor may act on a target member
    ///
    /// The guild owner may act on anyone; nobody else may act on the owner;
    /// otherwise the actor's highest role must strictly outrank the target's.
    pub fn can_manage_member(
        &self,
        guild_id: Snowflake,
        actor_id: Snowflake,
        target_id: Snowflake,
    ) -> Result<bool, DomainError> {
        if actor_id == target_id {
            return Ok(false);
        }
        let guild = self.require_guild(guild_id)?;
        if guild.is_owner(actor_id) {
            return Ok(true);
        }
        if guild.is_owner(target_id) {
            return Ok(false);
        }

        let actor_highest = self.highest_role_position(guild_id, actor_id)?;
        let target_highest = self.highest_role_position(guild_id, target_id)?;
        Ok(actor_highest > target_highest)
    }

    /// Check a member hierarchy action, surfacing denial as a typed error
    pub fn require_can_manage_member(
        &self,
        guild_id: Snowflake,
        actor_id: Snowflake,
        target_id: Snowflake,
    ) -> Result<(), DomainError> {
        if self.can_manage_member(guild_id, actor_id, target_id)? {
            Ok(())
        } else {
            Err(DomainError::HierarchyDenied)
        }
    }

    /// Check if an actor may act on a target role
    ///
    /// The everyone role can never be acted on; otherwise the actor's highest
    /// role must strictly outrank the target role (ties deny).
    pub fn can_manage_role(
        &self,
        guild_id: Snowflake,
        actor_id: Snowflake,
        role_id: Snowflake,
    ) -> Result<bool, DomainError> {
        let guild = self.require_guild(guild_id)?;
        let role = self
            .store
            .role(role_id)
            .ok_or(DomainError::RoleNotFound(role_id))?;
        if role.is_everyone() {
            return Ok(false);
        }
        if guild.is_owner(actor_id) {
            return Ok(true);
        }
        let actor_highest = self.highest_role_position(guild_id, actor_id)?;
        Ok(actor_highest > role.position)
    }

    /// Check a role hierarchy action, surfacing denial as a typed error
    pub fn require_can_manage_role(
        &self,
        guild_id: Snowflake,
        actor_id: Snowflake,
        role_id: Snowflake,
    ) -> Result<(), DomainError> {
        if self.can_manage_role(guild_id, actor_id, role_id)? {
            Ok(())
        } else {
            Err(DomainError::HierarchyDenied)
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    fn require_guild(&self, guild_id: Snowflake) -> Result<Guild, DomainError> {
        self.store
            .guild(guild_id)
            .ok_or(DomainError::GuildNotFound(guild_id))
    }

    fn require_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Member, DomainError> {
        self.store
            .member(guild_id, user_id)
            .ok_or(DomainError::MemberNotFound { guild_id, user_id })
    }
}
