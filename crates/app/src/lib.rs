//! Process entry point crate: wires the captioning pipeline's library
//! crates into one HTTP-controlled process. [`state`] holds process-wide
//! shared state; [`http`] is the control surface router.

pub mod http;
pub mod state;

pub use state::{AppState, RoomFactory, UnconfiguredRoomFactory};
