//! Gateway wire protocol
//!
//! Frame envelope, op codes, close codes, and typed payload bodies.

mod close_codes;
mod frame;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use frame::GatewayFrame;
pub use opcodes::OpCode;
pub use payloads::{
    ClientProperties, GuildData, GuildDeleteData, GuildStub, HelloPayload, IdentifyPayload,
    MemberChunkData, MemberData, MemberEventData, MemberRemoveData, ReadyPayload, ResumePayload,
    RoleDeleteData, RoleEventData,
};
