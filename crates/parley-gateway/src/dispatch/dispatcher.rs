//! Event dispatcher
//!
//! Applies dispatch payloads to the entity store and fans the resulting
//! domain events out to registered listeners. The store is always updated
//! before listeners run, so a listener reading the store sees state at
//! least as new as the event it is handling.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use parley_cache::EntityStore;
use parley_core::{Channel, Event, EventListener, Guild, Snowflake, User};

use crate::protocol::{
    GuildData, GuildDeleteData, MemberChunkData, MemberData, MemberEventData, MemberRemoveData,
    ReadyPayload, RoleDeleteData, RoleEventData,
};

use super::diff;

/// REST work a dispatch could not complete inline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationNeed {
    /// The guild arrived as an unavailable stub; fetch the whole payload
    FullGuild { guild_id: Snowflake },
    /// The guild payload carried a truncated member list
    Members { guild_id: Snowflake },
}

/// Applies dispatches to the store and notifies listeners
pub struct EventDispatcher {
    store: Arc<EntityStore>,
    listeners: RwLock<Vec<Box<dyn EventListener>>>,
    large_threshold: usize,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(store: Arc<EntityStore>, large_threshold: usize) -> Self {
        Self {
            store,
            listeners: RwLock::new(Vec::new()),
            large_threshold,
        }
    }

    /// Register a listener; it receives every event emitted from now on
    pub fn add_listener(&self, listener: Box<dyn EventListener>) {
        self.listeners.write().push(listener);
    }

    /// Deliver one event to every listener, isolating failures
    pub fn emit(&self, event: &Event) {
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            if let Err(e) = listener.on_event(event) {
                tracing::warn!(
                    event = event.kind_name(),
                    error = %e,
                    "Listener failed; continuing with remaining listeners"
                );
            }
        }
    }

    fn emit_all(&self, events: Vec<Event>) {
        for event in &events {
            self.emit(event);
        }
    }

    // =========================================================================
    // Snapshot hydration (silent store sync, no per-entity events)
    // =========================================================================

    /// Apply the READY snapshot
    ///
    /// The store is flushed first so the snapshot fully defines local state.
    /// Entities land silently; hydration never produces Created events.
    /// Returns the REST work the snapshot could not provide inline.
    pub fn apply_ready(&self, payload: ReadyPayload) -> Vec<HydrationNeed> {
        self.store.flush();
        self.store.upsert_user(payload.user);

        let mut needs = Vec::new();
        for value in payload.guilds {
            if value
                .get("unavailable")
                .and_then(Value::as_bool)
                .unwrap_or(false)
            {
                match serde_json::from_value::<crate::protocol::GuildStub>(value) {
                    Ok(stub) => needs.push(HydrationNeed::FullGuild { guild_id: stub.id }),
                    Err(e) => {
                        tracing::warn!(error = %e, "Malformed guild stub in READY, skipping");
                    }
                }
                continue;
            }

            match serde_json::from_value::<GuildData>(value) {
                Ok(data) => {
                    let guild_id = data.guild.id;
                    if self.sync_guild(data) {
                        needs.push(HydrationNeed::Members { guild_id });
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed guild in READY, skipping");
                }
            }
        }

        needs
    }

    /// Silently reconcile a full guild payload into the store
    ///
    /// Returns true when the member list was truncated and the rest of it
    /// should be fetched over REST.
    pub fn sync_guild(&self, data: GuildData) -> bool {
        let guild_id = data.guild.id;
        let member_count = data.member_count;
        let inline_members = data.members.len();

        self.store.upsert_guild(data.guild);
        for mut channel in data.channels {
            if channel.guild_id.is_zero() {
                channel.guild_id = guild_id;
            }
            self.store.upsert_channel(channel);
        }
        for mut role in data.roles {
            if role.guild_id.is_zero() {
                role.guild_id = guild_id;
            }
            self.store.upsert_role(role);
        }
        for member in data.members {
            let (user, member) = member.into_parts(guild_id);
            self.store.upsert_user(user);
            self.store.upsert_member(member);
        }

        let truncated = member_count.is_some_and(|count| count as usize > inline_members);
        data.large || truncated || inline_members >= self.large_threshold
    }

    /// Silently merge a REST- or chunk-provided member list
    pub fn merge_members(&self, guild_id: Snowflake, members: Vec<MemberData>) {
        let count = members.len();
        for member in members {
            let (user, member) = member.into_parts(guild_id);
            self.store.upsert_user(user);
            self.store.upsert_member(member);
        }
        tracing::debug!(guild_id = %guild_id, count, "Merged member list");
    }

    // =========================================================================
    // Dispatch handling
    // =========================================================================

    /// Apply one dispatch to the store and emit the resulting events
    ///
    /// Malformed payloads are logged and skipped; a bad dispatch never stops
    /// the session. Returns REST hydration work, which only `GUILD_CREATE`
    /// can produce.
    pub fn dispatch(&self, event_type: &str, data: Value) -> Vec<HydrationNeed> {
        match event_type {
            "GUILD_CREATE" => return self.on_guild_create(data),
            "GUILD_UPDATE" => self.on_guild_update(data),
            "GUILD_DELETE" => self.on_guild_delete(data),
            "CHANNEL_CREATE" => self.on_channel_create(data),
            "CHANNEL_UPDATE" => self.on_channel_update(data),
            "CHANNEL_DELETE" => self.on_channel_delete(data),
            "GUILD_ROLE_CREATE" => self.on_role_create(data),
            "GUILD_ROLE_UPDATE" => self.on_role_update(data),
            "GUILD_ROLE_DELETE" => self.on_role_delete(data),
            "GUILD_MEMBER_ADD" => self.on_member_add(data),
            "GUILD_MEMBER_UPDATE" => self.on_member_update(data),
            "GUILD_MEMBER_REMOVE" => self.on_member_remove(data),
            "GUILD_MEMBERS_CHUNK" => self.on_member_chunk(data),
            "USER_UPDATE" => self.on_user_update(data),
            other => {
                tracing::debug!(event_type = other, "Ignoring unhandled dispatch type");
            }
        }
        Vec::new()
    }

    fn on_guild_create(&self, data: Value) -> Vec<HydrationNeed> {
        let Some(data) = decode::<GuildData>("GUILD_CREATE", data) else {
            return Vec::new();
        };
        let guild_id = data.guild.id;
        let guild = data.guild.clone();
        let known = self.store.guild(guild_id).is_some();

        let needs_members = self.sync_guild(data);

        if known {
            // The server re-sent a guild we already track (e.g. it came back
            // from an outage); reconcile silently
            tracing::debug!(guild_id = %guild_id, "GUILD_CREATE for known guild, synced silently");
        } else {
            self.emit(&Event::GuildCreate(guild));
        }

        if needs_members {
            vec![HydrationNeed::Members { guild_id }]
        } else {
            Vec::new()
        }
    }

    fn on_guild_update(&self, data: Value) {
        let Some(guild) = decode::<Guild>("GUILD_UPDATE", data) else {
            return;
        };
        // An update for an entity the store never saw is discarded, never
        // promoted to a phantom create
        if self.store.guild(guild.id).is_none() {
            tracing::warn!(guild_id = %guild.id, "GUILD_UPDATE for unknown guild, discarding");
            return;
        }
        if let Some(old) = self.store.upsert_guild(guild.clone()) {
            self.emit_all(diff::diff_guild(&old, &guild));
        }
    }

    fn on_guild_delete(&self, data: Value) {
        let Some(delete) = decode::<GuildDeleteData>("GUILD_DELETE", data) else {
            return;
        };
        let Some(mut removed) = self.store.remove_guild(delete.id) else {
            tracing::debug!(guild_id = %delete.id, "GUILD_DELETE for unknown guild, ignoring");
            return;
        };

        if delete.unavailable {
            // An outage, not a departure; drop the stale state quietly
            tracing::info!(guild_id = %delete.id, "Guild became unavailable");
            return;
        }

        // Children first, then the guild itself, in a stable order
        removed
            .channels
            .sort_by_key(|c| (c.position, c.id));
        removed.roles.sort_by_key(|r| (r.position, r.id));
        removed.members.sort_by_key(|m| m.user_id);

        for channel in removed.channels {
            self.emit(&Event::ChannelDelete(channel));
        }
        for role in removed.roles {
            self.emit(&Event::RoleDelete(role));
        }
        for member in removed.members {
            self.emit(&Event::MemberLeave(member));
        }
        self.emit(&Event::GuildDelete(removed.guild));
    }

    fn on_channel_create(&self, data: Value) {
        let Some(channel) = decode::<Channel>("CHANNEL_CREATE", data) else {
            return;
        };
        match self.store.upsert_channel(channel.clone()) {
            // Replayed create: reconcile instead of announcing again
            Some(old) => self.emit_all(diff::diff_channel(&old, &channel)),
            None => self.emit(&Event::ChannelCreate(channel)),
        }
    }

    fn on_channel_update(&self, data: Value) {
        let Some(channel) = decode::<Channel>("CHANNEL_UPDATE", data) else {
            return;
        };
        if self.store.channel(channel.id).is_none() {
            tracing::warn!(channel_id = %channel.id, "CHANNEL_UPDATE for unknown channel, discarding");
            return;
        }
        if let Some(old) = self.store.upsert_channel(channel.clone()) {
            self.emit_all(diff::diff_channel(&old, &channel));
        }
    }

    fn on_channel_delete(&self, data: Value) {
        let Some(channel) = decode::<Channel>("CHANNEL_DELETE", data) else {
            return;
        };
        if let Some(removed) = self.store.remove_channel(channel.id) {
            self.emit(&Event::ChannelDelete(removed));
        }
    }

    fn on_role_create(&self, data: Value) {
        let Some(event) = decode::<RoleEventData>("GUILD_ROLE_CREATE", data) else {
            return;
        };
        let mut role = event.role;
        if role.guild_id.is_zero() {
            role.guild_id = event.guild_id;
        }
        match self.store.upsert_role(role.clone()) {
            Some(old) => self.emit_all(diff::diff_role(&old, &role)),
            None => self.emit(&Event::RoleCreate(role)),
        }
    }

    fn on_role_update(&self, data: Value) {
        let Some(event) = decode::<RoleEventData>("GUILD_ROLE_UPDATE", data) else {
            return;
        };
        let mut role = event.role;
        if role.guild_id.is_zero() {
            role.guild_id = event.guild_id;
        }
        if self.store.role(role.id).is_none() {
            tracing::warn!(
                guild_id = %event.guild_id,
                role_id = %role.id,
                "GUILD_ROLE_UPDATE for unknown role, discarding"
            );
            return;
        }
        if let Some(old) = self.store.upsert_role(role.clone()) {
            self.emit_all(diff::diff_role(&old, &role));
        }
    }

    fn on_role_delete(&self, data: Value) {
        let Some(event) = decode::<RoleDeleteData>("GUILD_ROLE_DELETE", data) else {
            return;
        };
        if let Some(removed) = self.store.remove_role(event.role_id) {
            self.emit(&Event::RoleDelete(removed));
        }
    }

    fn on_member_add(&self, data: Value) {
        let Some(event) = decode::<MemberEventData>("GUILD_MEMBER_ADD", data) else {
            return;
        };
        let (user, member) = event.member.into_parts(event.guild_id);
        self.store.upsert_user(user);
        match self.store.upsert_member(member.clone()) {
            // Replayed join
            Some(old) => self.emit_all(diff::diff_member(&old, &member)),
            None => self.emit(&Event::MemberJoin(member)),
        }
    }

    fn on_member_update(&self, data: Value) {
        let Some(event) = decode::<MemberEventData>("GUILD_MEMBER_UPDATE", data) else {
            return;
        };
        let wire_joined_at = event.member.joined_at;
        let (user, mut member) = event.member.into_parts(event.guild_id);
        let Some(old) = self.store.member(member.guild_id, member.user_id) else {
            tracing::warn!(
                guild_id = %member.guild_id,
                user_id = %member.user_id,
                "GUILD_MEMBER_UPDATE for unknown member, discarding"
            );
            return;
        };
        // Update bodies usually omit joined_at; the cached timestamp stands
        if wire_joined_at.is_none() {
            member.joined_at = old.joined_at;
        }
        self.store.upsert_user(user);
        self.store.upsert_member(member.clone());
        self.emit_all(diff::diff_member(&old, &member));
    }

    fn on_member_remove(&self, data: Value) {
        let Some(event) = decode::<MemberRemoveData>("GUILD_MEMBER_REMOVE", data) else {
            return;
        };
        if let Some(removed) = self.store.remove_member(event.guild_id, event.user.id) {
            self.emit(&Event::MemberLeave(removed));
        }
    }

    fn on_member_chunk(&self, data: Value) {
        let Some(chunk) = decode::<MemberChunkData>("GUILD_MEMBERS_CHUNK", data) else {
            return;
        };
        self.merge_members(chunk.guild_id, chunk.members);
    }

    fn on_user_update(&self, data: Value) {
        let Some(user) = decode::<User>("USER_UPDATE", data) else {
            return;
        };
        if self.store.user(user.id).is_none() {
            tracing::warn!(user_id = %user.id, "USER_UPDATE for unknown user, discarding");
            return;
        }
        if let Some(old) = self.store.upsert_user(user.clone()) {
            self.emit_all(diff::diff_user(&old, &user));
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(event_type: &str, data: Value) -> Option<T> {
    match serde_json::from_value(data) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(event_type, error = %e, "Malformed dispatch payload, skipping");
            None
        }
    }
}
