//! The conferencing room seam: [`client::RoomClient`] is what the session
//! orchestrator depends on, [`memory::MemoryRoomClient`] is the in-process
//! double the test suite runs against. A production implementation against
//! a live SDK is out of this repo's scope (see spec §1) and is not
//! provided here.

pub mod client;
pub mod identity;
pub mod memory;
pub mod unavailable;

pub use client::{RoomClient, TrackSubscription};
pub use identity::AgentIdentity;
pub use memory::{ConnectCall, MemoryRoomClient, MemoryRoomHandles};
pub use unavailable::UnavailableRoomClient;
