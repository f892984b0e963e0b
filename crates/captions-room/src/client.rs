//! Conferencing room abstraction.
//!
//! The live conferencing SDK is an external collaborator outside this
//! repo's scope: `RoomClient` is the seam the orchestrator is written
//! against so it stays testable without one. A production implementation
//! (e.g. a LiveKit-style room client) plugs in here; [`crate::memory`]
//! is the in-process double the test suite uses instead.

use async_trait::async_trait;
use tokio::sync::mpsc;

use captions_audio::AudioFrame;
use captions_foundation::error::RoomError;
use captions_foundation::SpeakerId;
use captions_publish::DataPublisher;

use crate::identity::AgentIdentity;

/// One subscribed remote audio track: the speaker it belongs to, plus the
/// frame stream the per-speaker pipeline task reads from.
pub struct TrackSubscription {
    pub speaker: SpeakerId,
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: mpsc::Receiver<AudioFrame>,
}

/// The room-level operations the session orchestrator needs: joining with
/// the agent's identity, discovering subscribed audio tracks, receiving
/// inbound data-channel messages, and (via the `DataPublisher` supertrait)
/// publishing outbound ones. A `RoomClient` is shared across every
/// per-speaker pipeline task for a room, so all methods take `&self`.
#[async_trait]
pub trait RoomClient: DataPublisher {
    /// Joins `room_name` under `identity`. Called once per room at
    /// `/start`; failure here must not leave a half-initialized session.
    async fn connect(&self, room_name: &str, identity: &AgentIdentity) -> Result<(), RoomError>;

    /// Returns the receiving end of the room's audio-track-subscribed
    /// event stream. Each item spawns one independent pipeline (C3-C8).
    async fn subscribe_audio_tracks(&self) -> Result<mpsc::Receiver<TrackSubscription>, RoomError>;

    /// Returns the receiving end of inbound data-channel messages on
    /// `topic`, as raw JSON payloads. Unknown topics/types are the
    /// caller's responsibility to ignore, per spec.md §6.
    async fn subscribe_data_messages(&self, topic: &str) -> Result<mpsc::Receiver<Vec<u8>>, RoomError>;

    /// Leaves the room. Best-effort: any error is logged by the caller,
    /// never propagated to block process shutdown.
    async fn disconnect(&self) -> Result<(), RoomError>;
}
