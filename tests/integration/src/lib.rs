//! Integration test utilities for the gateway client
//!
//! Provides a scripted in-memory transport, a canned REST collaborator, and
//! payload fixtures so end-to-end session tests run without a network.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
