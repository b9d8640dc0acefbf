//! Actors hosting live actor instances for the in-process cluster
//!
//! Each remote actor is backed by one Ractor actor whose mailbox serializes task
//! execution, which gives per-actor submission ordering for free.

pub mod host;
pub mod message;

pub use host::*;
pub use message::*;
