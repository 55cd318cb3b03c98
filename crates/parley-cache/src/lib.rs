//! # parley-cache
//!
//! The authoritative in-memory mirror of remote state, plus permission
//! resolution over it. Writes are serialized through the dispatcher path;
//! reads may come from any number of concurrent callers and never observe a
//! partially-applied mutation.

mod resolver;
mod store;

pub use resolver::PermissionResolver;
pub use store::{EntityStore, RemovedGuild};
