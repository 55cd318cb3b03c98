//! REST collaborator
//!
//! The gateway core only needs request/response access for snapshot
//! hydration (unavailable guilds, truncated member lists). Everything else
//! about the REST surface — rate limiting, the full endpoint catalogue —
//! lives behind the `RestClient` trait and is out of scope here.

mod http;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use parley_core::Snowflake;

use crate::protocol::{GuildData, MemberData};

pub use http::HttpRestClient;

/// REST layer errors
#[derive(Debug, Error)]
pub enum RestError {
    /// Transport-level failure (DNS, TCP, TLS)
    #[error("request failed: {0}")]
    Http(String),

    /// The credential was rejected
    #[error("unauthorized")]
    Unauthorized,

    /// The resource does not exist
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The API answered with a non-success status
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The request exceeded its deadline
    #[error("request timed out")]
    Timeout,
}

/// HTTP method for a REST request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl RestMethod {
    /// The method name on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Request/response access to the platform API
///
/// Implementations own their timeout and bounded-retry policy.
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn request(
        &self,
        method: RestMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, RestError>;
}

/// Fetch a full guild payload, used to hydrate unavailable READY stubs
pub async fn fetch_guild(rest: &dyn RestClient, guild_id: Snowflake) -> Result<GuildData, RestError> {
    let value = rest
        .request(RestMethod::Get, &format!("/guilds/{guild_id}"), None)
        .await?;
    serde_json::from_value(value).map_err(|e| RestError::Decode(e.to_string()))
}

/// Fetch a guild's full member list, used when the inline list was truncated
pub async fn fetch_members(
    rest: &dyn RestClient,
    guild_id: Snowflake,
) -> Result<Vec<MemberData>, RestError> {
    let value = rest
        .request(
            RestMethod::Get,
            &format!("/guilds/{guild_id}/members?limit=1000"),
            None,
        )
        .await?;
    serde_json::from_value(value).map_err(|e| RestError::Decode(e.to_string()))
}
