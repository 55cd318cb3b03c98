//! Listener seam - the capability interface application code implements
//!
//! Instead of one subclass per field-change kind, listeners implement the
//! fine-grained hooks for the event kinds they care about; the default
//! `on_event` routes each `Event` variant to its hook. A listener that wants
//! every event as a stream can override `on_event` directly.

use super::event::{
    ChannelChange, Event, GuildChange, MemberChange, RoleChange, UserChange,
};
use crate::entities::{Channel, Guild, Member, Role};
use crate::value_objects::Snowflake;

/// Result of a listener callback; an error is logged and isolated by the
/// dispatcher, never propagated to other listeners or later events
pub type ListenerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Capability interface for domain event consumers
#[allow(unused_variables)]
pub trait EventListener: Send + Sync {
    /// Route an event to the matching fine-grained hook
    fn on_event(&self, event: &Event) -> ListenerResult {
        match event {
            Event::Ready { session_id } => self.on_ready(session_id),
            Event::Resumed => self.on_resumed(),
            Event::GuildCreate(guild) => self.on_guild_create(guild),
            Event::GuildUpdate { guild_id, change } => self.on_guild_update(*guild_id, change),
            Event::GuildDelete(guild) => self.on_guild_delete(guild),
            Event::ChannelCreate(channel) => self.on_channel_create(channel),
            Event::ChannelUpdate { channel_id, change } => {
                self.on_channel_update(*channel_id, change)
            }
            Event::ChannelDelete(channel) => self.on_channel_delete(channel),
            Event::RoleCreate(role) => self.on_role_create(role),
            Event::RoleUpdate {
                guild_id,
                role_id,
                change,
            } => self.on_role_update(*guild_id, *role_id, change),
            Event::RoleDelete(role) => self.on_role_delete(role),
            Event::MemberJoin(member) => self.on_member_join(member),
            Event::MemberUpdate {
                guild_id,
                user_id,
                change,
            } => self.on_member_update(*guild_id, *user_id, change),
            Event::MemberLeave(member) => self.on_member_leave(member),
            Event::UserUpdate { user_id, change } => self.on_user_update(*user_id, change),
        }
    }

    fn on_ready(&self, session_id: &str) -> ListenerResult {
        Ok(())
    }

    fn on_resumed(&self) -> ListenerResult {
        Ok(())
    }

    fn on_guild_create(&self, guild: &Guild) -> ListenerResult {
        Ok(())
    }

    fn on_guild_update(&self, guild_id: Snowflake, change: &GuildChange) -> ListenerResult {
        Ok(())
    }

    fn on_guild_delete(&self, guild: &Guild) -> ListenerResult {
        Ok(())
    }

    fn on_channel_create(&self, channel: &Channel) -> ListenerResult {
        Ok(())
    }

    fn on_channel_update(&self, channel_id: Snowflake, change: &ChannelChange) -> ListenerResult {
        Ok(())
    }

    fn on_channel_delete(&self, channel: &Channel) -> ListenerResult {
        Ok(())
    }

    fn on_role_create(&self, role: &Role) -> ListenerResult {
        Ok(())
    }

    fn on_role_update(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        change: &RoleChange,
    ) -> ListenerResult {
        Ok(())
    }

    fn on_role_delete(&self, role: &Role) -> ListenerResult {
        Ok(())
    }

    fn on_member_join(&self, member: &Member) -> ListenerResult {
        Ok(())
    }

    fn on_member_update(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        change: &MemberChange,
    ) -> ListenerResult {
        Ok(())
    }

    fn on_member_leave(&self, member: &Member) -> ListenerResult {
        Ok(())
    }

    fn on_user_update(&self, user_id: Snowflake, change: &UserChange) -> ListenerResult {
        Ok(())
    }
}
