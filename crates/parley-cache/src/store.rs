//! Entity store - lock-guarded mirror of guilds, channels, roles, members, users
//!
//! All maps live behind a single `RwLock` so that every upsert, removal, and
//! cascade is atomic from a reader's point of view. Upserts replace the value
//! in its map slot (identity-preserving update-by-id) and return the previous
//! snapshot for diffing; entities are never deleted and reinserted on update.

use std::collections::HashMap;

use parking_lot::RwLock;

use parley_core::{Channel, Guild, Member, Role, Snowflake, User};

/// Everything removed by a guild cascade, for delete-event synthesis
#[derive(Debug, Clone)]
pub struct RemovedGuild {
    pub guild: Guild,
    pub channels: Vec<Channel>,
    pub roles: Vec<Role>,
    pub members: Vec<Member>,
}

#[derive(Default)]
struct StoreInner {
    guilds: HashMap<Snowflake, Guild>,
    channels: HashMap<Snowflake, Channel>,
    roles: HashMap<Snowflake, Role>,
    members: HashMap<(Snowflake, Snowflake), Member>,
    users: HashMap<Snowflake, User>,
}

/// The in-memory entity cache
#[derive(Default)]
pub struct EntityStore {
    inner: RwLock<StoreInner>,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get a guild snapshot by id
    pub fn guild(&self, id: Snowflake) -> Option<Guild> {
        self.inner.read().guilds.get(&id).cloned()
    }

    /// Get a channel snapshot by id
    pub fn channel(&self, id: Snowflake) -> Option<Channel> {
        self.inner.read().channels.get(&id).cloned()
    }

    /// Get a role snapshot by id
    pub fn role(&self, id: Snowflake) -> Option<Role> {
        self.inner.read().roles.get(&id).cloned()
    }

    /// Get a member snapshot by guild and user id
    pub fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        self.inner.read().members.get(&(guild_id, user_id)).cloned()
    }

    /// Get a user snapshot by id
    pub fn user(&self, id: Snowflake) -> Option<User> {
        self.inner.read().users.get(&id).cloned()
    }

    /// All guilds currently mirrored
    pub fn guilds(&self) -> Vec<Guild> {
        self.inner.read().guilds.values().cloned().collect()
    }

    /// A guild's channels, ordered by position then id
    pub fn guild_channels(&self, guild_id: Snowflake) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self
            .inner
            .read()
            .channels
            .values()
            .filter(|c| c.guild_id == guild_id)
            .cloned()
            .collect();
        channels.sort_by_key(|c| (c.position, c.id));
        channels
    }

    /// A guild's roles, ordered by position (hierarchy rank) then id
    pub fn guild_roles(&self, guild_id: Snowflake) -> Vec<Role> {
        let mut roles: Vec<Role> = self
            .inner
            .read()
            .roles
            .values()
            .filter(|r| r.guild_id == guild_id)
            .cloned()
            .collect();
        roles.sort_by_key(|r| (r.position, r.id));
        roles
    }

    /// A guild's members, ordered by user id
    pub fn guild_members(&self, guild_id: Snowflake) -> Vec<Member> {
        let mut members: Vec<Member> = self
            .inner
            .read()
            .members
            .values()
            .filter(|m| m.guild_id == guild_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.user_id);
        members
    }

    /// Resolve a member's roles, dropping references that do not resolve to a
    /// role of the same guild
    ///
    /// The implicit everyone role is included when present. Dangling
    /// references are logged as cache consistency warnings.
    pub fn member_roles(&self, guild_id: Snowflake, user_id: Snowflake) -> Vec<Role> {
        let inner = self.inner.read();
        let Some(member) = inner.members.get(&(guild_id, user_id)) else {
            return Vec::new();
        };

        let mut roles = Vec::with_capacity(member.role_ids.len() + 1);
        if let Some(everyone) = inner.roles.get(&guild_id) {
            roles.push(everyone.clone());
        }
        for role_id in &member.role_ids {
            match inner.roles.get(role_id) {
                Some(role) if role.guild_id == guild_id => roles.push(role.clone()),
                Some(role) => {
                    tracing::warn!(
                        guild_id = %guild_id,
                        user_id = %user_id,
                        role_id = %role_id,
                        role_guild = %role.guild_id,
                        "member references a role of another guild, dropping"
                    );
                }
                None => {
                    tracing::warn!(
                        guild_id = %guild_id,
                        user_id = %user_id,
                        role_id = %role_id,
                        "member references an unknown role, dropping"
                    );
                }
            }
        }
        roles
    }

    /// Check whether the store holds no entities at all
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read();
        inner.guilds.is_empty()
            && inner.channels.is_empty()
            && inner.roles.is_empty()
            && inner.members.is_empty()
            && inner.users.is_empty()
    }

    // =========================================================================
    // Writes (serialized through the dispatcher path)
    // =========================================================================

    /// Insert or replace a guild; returns the previous snapshot if present
    pub fn upsert_guild(&self, guild: Guild) -> Option<Guild> {
        self.inner.write().guilds.insert(guild.id, guild)
    }

    /// Insert or replace a channel; returns the previous snapshot if present
    pub fn upsert_channel(&self, channel: Channel) -> Option<Channel> {
        self.inner.write().channels.insert(channel.id, channel)
    }

    /// Insert or replace a role; returns the previous snapshot if present
    pub fn upsert_role(&self, role: Role) -> Option<Role> {
        self.inner.write().roles.insert(role.id, role)
    }

    /// Insert or replace a member; returns the previous snapshot if present
    pub fn upsert_member(&self, member: Member) -> Option<Member> {
        self.inner
            .write()
            .members
            .insert((member.guild_id, member.user_id), member)
    }

    /// Insert or replace a user; returns the previous snapshot if present
    pub fn upsert_user(&self, user: User) -> Option<User> {
        self.inner.write().users.insert(user.id, user)
    }

    /// Remove a guild and cascade to its channels, roles, and members
    ///
    /// The whole cascade happens under one write lock; a concurrent reader
    /// sees either the full guild or none of it. Returned children are in the
    /// same deterministic order the `guild_*` views use.
    pub fn remove_guild(&self, id: Snowflake) -> Option<RemovedGuild> {
        let mut inner = self.inner.write();
        let guild = inner.guilds.remove(&id)?;

        let mut channels: Vec<Channel> = Vec::new();
        inner.channels.retain(|_, c| {
            if c.guild_id == id {
                channels.push(c.clone());
                false
            } else {
                true
            }
        });
        channels.sort_by_key(|c| (c.position, c.id));

        let mut roles: Vec<Role> = Vec::new();
        inner.roles.retain(|_, r| {
            if r.guild_id == id {
                roles.push(r.clone());
                false
            } else {
                true
            }
        });
        roles.sort_by_key(|r| (r.position, r.id));

        let mut members: Vec<Member> = Vec::new();
        inner.members.retain(|_, m| {
            if m.guild_id == id {
                members.push(m.clone());
                false
            } else {
                true
            }
        });
        members.sort_by_key(|m| m.user_id);

        Some(RemovedGuild {
            guild,
            channels,
            roles,
            members,
        })
    }

    /// Remove a channel; returns the removed snapshot
    pub fn remove_channel(&self, id: Snowflake) -> Option<Channel> {
        self.inner.write().channels.remove(&id)
    }

    /// Remove a role; returns the removed snapshot
    ///
    /// References to the role held by members of the same guild are dropped
    /// under the same lock, so no reader observes a dangling reference.
    pub fn remove_role(&self, id: Snowflake) -> Option<Role> {
        let mut inner = self.inner.write();
        let role = inner.roles.remove(&id)?;
        for member in inner.members.values_mut() {
            if member.guild_id == role.guild_id {
                member.role_ids.retain(|&rid| rid != id);
            }
        }
        Some(role)
    }

    /// Remove a member; returns the removed snapshot
    pub fn remove_member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        self.inner.write().members.remove(&(guild_id, user_id))
    }

    /// Clear all entities (non-resumable session loss)
    pub fn flush(&self) {
        let mut inner = self.inner.write();
        inner.guilds.clear();
        inner.channels.clear();
        inner.roles.clear();
        inner.members.clear();
        inner.users.clear();
    }
}
