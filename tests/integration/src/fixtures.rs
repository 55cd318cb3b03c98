//! Test fixtures and payload generators
//!
//! JSON bodies shaped the way the gateway sends them, for feeding through
//! the scripted transport.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A user body
pub fn user_json(id: u64, username: &str) -> Value {
    json!({
        "id": id.to_string(),
        "username": username,
        "discriminator": "0001"
    })
}

/// A member body as nested in guild payloads
pub fn member_json(user_id: u64, username: &str) -> Value {
    json!({ "user": user_json(user_id, username) })
}

/// A role body as nested in guild payloads
pub fn role_json(id: u64, name: &str, permissions: u64, position: i32) -> Value {
    json!({
        "id": id.to_string(),
        "name": name,
        "permissions": permissions.to_string(),
        "position": position
    })
}

/// A text channel body as nested in guild payloads
pub fn channel_json(id: u64, name: &str, position: i32) -> Value {
    json!({
        "id": id.to_string(),
        "type": 0,
        "name": name,
        "position": position
    })
}

/// A small but complete guild payload: one owner member, the everyone role,
/// and one text channel with id `guild_id * 10`
pub fn guild_payload(guild_id: u64, name: &str) -> Value {
    json!({
        "id": guild_id.to_string(),
        "name": name,
        "owner_id": "1",
        "roles": [role_json(guild_id, "@everyone", 1024, 0)],
        "channels": [channel_json(guild_id * 10, "general", 0)],
        "members": [member_json(1, "alice")]
    })
}

/// An unavailable guild stub as it appears in READY
pub fn unavailable_stub(guild_id: u64) -> Value {
    json!({ "id": guild_id.to_string(), "unavailable": true })
}

/// A READY body for the given guild payloads
pub fn ready_payload(session_id: &str, guilds: Vec<Value>) -> Value {
    json!({
        "session_id": session_id,
        "user": user_json(1, "alice"),
        "guilds": guilds
    })
}

/// A GUILD_UPDATE body renaming a guild
pub fn guild_rename(guild_id: u64, name: &str) -> Value {
    json!({
        "id": guild_id.to_string(),
        "name": name,
        "owner_id": "1"
    })
}
