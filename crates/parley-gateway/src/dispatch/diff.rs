//! Entity diffing
//!
//! Update dispatches carry whole entities. These functions compare the cached
//! snapshot against the incoming one and produce one event per field group
//! that actually changed, so an unchanged field never reaches a listener.

use parley_core::{
    Channel, ChannelChange, ChannelKind, Event, Guild, GuildChange, Member, MemberChange, Role,
    RoleChange, Snowflake, User, UserChange,
};

pub fn diff_guild(old: &Guild, new: &Guild) -> Vec<Event> {
    let mut events = Vec::new();
    let mut push = |change: GuildChange| {
        events.push(Event::GuildUpdate {
            guild_id: new.id,
            change,
        });
    };

    if old.name != new.name {
        push(GuildChange::Name {
            old: old.name.clone(),
            new: new.name.clone(),
        });
    }
    if old.icon != new.icon {
        push(GuildChange::Icon {
            old: old.icon.clone(),
            new: new.icon.clone(),
        });
    }
    if old.region != new.region {
        push(GuildChange::Region {
            old: old.region.clone(),
            new: new.region.clone(),
        });
    }
    if old.owner_id != new.owner_id {
        push(GuildChange::Owner {
            old: old.owner_id,
            new: new.owner_id,
        });
    }
    if old.afk_channel_id != new.afk_channel_id {
        push(GuildChange::AfkChannel {
            old: old.afk_channel_id,
            new: new.afk_channel_id,
        });
    }
    if old.afk_timeout != new.afk_timeout {
        push(GuildChange::AfkTimeout {
            old: old.afk_timeout,
            new: new.afk_timeout,
        });
    }
    if old.verification_level != new.verification_level {
        push(GuildChange::Verification {
            old: old.verification_level,
            new: new.verification_level,
        });
    }
    if old.notification_level != new.notification_level {
        push(GuildChange::Notification {
            old: old.notification_level,
            new: new.notification_level,
        });
    }

    events
}

pub fn diff_channel(old: &Channel, new: &Channel) -> Vec<Event> {
    let mut events = Vec::new();
    let mut push = |change| {
        events.push(Event::ChannelUpdate {
            channel_id: new.id,
            change,
        });
    };

    if old.name != new.name {
        push(ChannelChange::Name {
            old: old.name.clone(),
            new: new.name.clone(),
        });
    }
    if old.position != new.position {
        push(ChannelChange::Position {
            old: old.position,
            new: new.position,
        });
    }
    match (&old.kind, &new.kind) {
        (ChannelKind::Text { topic: old_topic }, ChannelKind::Text { topic: new_topic }) => {
            if old_topic != new_topic {
                push(ChannelChange::Topic {
                    old: old_topic.clone(),
                    new: new_topic.clone(),
                });
            }
        }
        (
            ChannelKind::Voice {
                bitrate: old_bitrate,
                user_limit: old_limit,
            },
            ChannelKind::Voice {
                bitrate: new_bitrate,
                user_limit: new_limit,
            },
        ) => {
            if old_bitrate != new_bitrate {
                push(ChannelChange::Bitrate {
                    old: *old_bitrate,
                    new: *new_bitrate,
                });
            }
            if old_limit != new_limit {
                push(ChannelChange::UserLimit {
                    old: *old_limit,
                    new: *new_limit,
                });
            }
        }
        // A channel never changes kind mid-life; nothing sensible to diff
        _ => {}
    }
    if old.overwrites != new.overwrites {
        push(ChannelChange::Overwrites {
            old: old.overwrites.clone(),
            new: new.overwrites.clone(),
        });
    }

    events
}

pub fn diff_role(old: &Role, new: &Role) -> Vec<Event> {
    let mut events = Vec::new();
    let mut push = |change| {
        events.push(Event::RoleUpdate {
            guild_id: new.guild_id,
            role_id: new.id,
            change,
        });
    };

    if old.name != new.name {
        push(RoleChange::Name {
            old: old.name.clone(),
            new: new.name.clone(),
        });
    }
    if old.color != new.color {
        push(RoleChange::Color {
            old: old.color,
            new: new.color,
        });
    }
    if old.position != new.position {
        push(RoleChange::Position {
            old: old.position,
            new: new.position,
        });
    }
    if old.permissions != new.permissions {
        push(RoleChange::Permissions {
            old: old.permissions,
            new: new.permissions,
        });
    }
    if old.hoisted != new.hoisted {
        push(RoleChange::Hoisted {
            old: old.hoisted,
            new: new.hoisted,
        });
    }
    if old.mentionable != new.mentionable {
        push(RoleChange::Mentionable {
            old: old.mentionable,
            new: new.mentionable,
        });
    }

    events
}

pub fn diff_member(old: &Member, new: &Member) -> Vec<Event> {
    let mut events = Vec::new();
    let mut push = |change| {
        events.push(Event::MemberUpdate {
            guild_id: new.guild_id,
            user_id: new.user_id,
            change,
        });
    };

    if old.nickname != new.nickname {
        push(MemberChange::Nickname {
            old: old.nickname.clone(),
            new: new.nickname.clone(),
        });
    }
    if !same_role_set(&old.role_ids, &new.role_ids) {
        push(MemberChange::Roles {
            old: old.role_ids.clone(),
            new: new.role_ids.clone(),
        });
    }
    if old.mute != new.mute {
        push(MemberChange::Mute {
            old: old.mute,
            new: new.mute,
        });
    }
    if old.deaf != new.deaf {
        push(MemberChange::Deaf {
            old: old.deaf,
            new: new.deaf,
        });
    }

    events
}

pub fn diff_user(old: &User, new: &User) -> Vec<Event> {
    let mut events = Vec::new();
    let mut push = |change| {
        events.push(Event::UserUpdate {
            user_id: new.id,
            change,
        });
    };

    if old.username != new.username {
        push(UserChange::Username {
            old: old.username.clone(),
            new: new.username.clone(),
        });
    }
    if old.discriminator != new.discriminator {
        push(UserChange::Discriminator {
            old: old.discriminator.clone(),
            new: new.discriminator.clone(),
        });
    }
    if old.avatar != new.avatar {
        push(UserChange::Avatar {
            old: old.avatar.clone(),
            new: new.avatar.clone(),
        });
    }

    events
}

/// Role lists come in wire order, which is not stable across dispatches
fn same_role_set(old: &[Snowflake], new: &[Snowflake]) -> bool {
    if old.len() != new.len() {
        return false;
    }
    let mut old_sorted: Vec<Snowflake> = old.to_vec();
    let mut new_sorted: Vec<Snowflake> = new.to_vec();
    old_sorted.sort_unstable();
    new_sorted.sort_unstable();
    old_sorted == new_sorted
}
