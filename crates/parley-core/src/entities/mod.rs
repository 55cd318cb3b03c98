//! Entity types mirrored from the remote platform
//!
//! These are plain data snapshots; the authoritative copy lives in the
//! `EntityStore` and is replaced wholesale on update events.

mod channel;
mod guild;
mod member;
mod overwrite;
mod role;
mod user;

pub use channel::{Channel, ChannelKind};
pub use guild::{Guild, NotificationLevel, VerificationLevel};
pub use member::Member;
pub use overwrite::{OverwriteKind, PermissionOverwrite};
pub use role::Role;
pub use user::User;
