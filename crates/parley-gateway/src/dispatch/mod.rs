//! Dispatch pipeline: payload decoding, entity diffing, listener delivery

mod diff;
mod dispatcher;

pub use dispatcher::{EventDispatcher, HydrationNeed};
