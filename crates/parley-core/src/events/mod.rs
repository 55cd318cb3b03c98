//! Domain events synthesized from gateway dispatches

mod event;
mod listener;

pub use event::{ChannelChange, Event, GuildChange, MemberChange, RoleChange, UserChange};
pub use listener::{EventListener, ListenerResult};
