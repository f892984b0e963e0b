//! Placeholder `RoomClient` for deployments that have not wired in a real
//! conferencing SDK integration.
//!
//! Joining a live conference room is an external collaborator outside this
//! repo's scope (spec.md §1): the production `RoomClient` implementation
//! is an integration seam left to whoever wires this crate to an actual
//! room service. Using this placeholder as the control surface's default
//! factory keeps `/start` honest about that gap rather than panicking or
//! silently no-opping — it fails the same way any other misconfigured
//! external dependency would, via spec.md §7's "fatal startup" path.

use async_trait::async_trait;
use tokio::sync::mpsc;

use captions_foundation::error::RoomError;

use crate::client::{RoomClient, TrackSubscription};
use crate::identity::AgentIdentity;
use captions_publish::DataPublisher;

#[derive(Debug, Clone, Default)]
pub struct UnavailableRoomClient;

#[async_trait]
impl RoomClient for UnavailableRoomClient {
    async fn connect(&self, room_name: &str, _identity: &AgentIdentity) -> Result<(), RoomError> {
        Err(RoomError::ConnectFailed {
            room: room_name.to_string(),
            reason: "no conferencing room client configured for this deployment".to_string(),
        })
    }

    async fn subscribe_audio_tracks(&self) -> Result<mpsc::Receiver<TrackSubscription>, RoomError> {
        Err(RoomError::ConnectFailed {
            room: String::new(),
            reason: "no conferencing room client configured for this deployment".to_string(),
        })
    }

    async fn subscribe_data_messages(&self, _topic: &str) -> Result<mpsc::Receiver<Vec<u8>>, RoomError> {
        Err(RoomError::ConnectFailed {
            room: String::new(),
            reason: "no conferencing room client configured for this deployment".to_string(),
        })
    }

    async fn disconnect(&self) -> Result<(), RoomError> {
        Ok(())
    }
}

#[async_trait]
impl DataPublisher for UnavailableRoomClient {
    async fn publish_data(&self, _topic: &str, _payload: Vec<u8>, _reliable: bool) -> Result<(), RoomError> {
        Err(RoomError::PublishFailed("no conferencing room client configured".to_string()))
    }

    async fn send_chat(&self, _line: &str) -> Result<(), RoomError> {
        Err(RoomError::PublishFailed("no conferencing room client configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_always_fails_without_leaving_partial_state() {
        let client = UnavailableRoomClient;
        let result = client.connect("room-1", &AgentIdentity::default()).await;
        assert!(matches!(result, Err(RoomError::ConnectFailed { .. })));
    }
}
