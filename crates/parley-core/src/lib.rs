//! # parley-core
//!
//! Domain layer containing entities, value objects, domain events, and the
//! listener seam. This crate has zero dependencies on transport or runtime
//! infrastructure (WebSocket, HTTP, tokio, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Channel, ChannelKind, Guild, Member, NotificationLevel, OverwriteKind, PermissionOverwrite,
    Role, User, VerificationLevel,
};
pub use error::DomainError;
pub use events::{
    ChannelChange, Event, EventListener, GuildChange, ListenerResult, MemberChange, RoleChange,
    UserChange,
};
pub use value_objects::{Permissions, Snowflake, SnowflakeParseError};
