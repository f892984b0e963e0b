//! In-process `RoomClient`/`DataPublisher` double. Tests drive a session
//! by pushing track subscriptions and inbound data messages through the
//! sender halves and asserting against what got published.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use captions_foundation::error::RoomError;
use captions_publish::DataPublisher;

use crate::client::{RoomClient, TrackSubscription};
use crate::identity::AgentIdentity;

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectCall {
    pub room_name: String,
    pub identity: AgentIdentity,
}

struct Inner {
    connected: bool,
    connect_calls: Vec<ConnectCall>,
    disconnect_calls: u32,
    track_rx: Option<mpsc::Receiver<TrackSubscription>>,
    data_rx: Option<mpsc::Receiver<Vec<u8>>>,
    published: Vec<(String, Vec<u8>)>,
    chat: Vec<String>,
}

/// Memory-backed room client. Construct with [`MemoryRoomClient::new`],
/// keep the returned handles to drive/inspect it, and hand the
/// `MemoryRoomClient` itself to the orchestrator as the `RoomClient`.
pub struct MemoryRoomClient {
    inner: Mutex<Inner>,
}

/// Senders a test uses to simulate room events. Paired with a
/// [`MemoryRoomClient`] by [`MemoryRoomClient::new`].
pub struct MemoryRoomHandles {
    pub tracks: mpsc::Sender<TrackSubscription>,
    pub data_messages: mpsc::Sender<Vec<u8>>,
}

impl MemoryRoomClient {
    pub fn new() -> (Self, MemoryRoomHandles) {
        let (track_tx, track_rx) = mpsc::channel(16);
        let (data_tx, data_rx) = mpsc::channel(16);
        let client = Self {
            inner: Mutex::new(Inner {
                connected: false,
                connect_calls: Vec::new(),
                disconnect_calls: 0,
                track_rx: Some(track_rx),
                data_rx: Some(data_rx),
                published: Vec::new(),
                chat: Vec::new(),
            }),
        };
        (
            client,
            MemoryRoomHandles {
                tracks: track_tx,
                data_messages: data_tx,
            },
        )
    }

    pub fn connect_calls(&self) -> Vec<ConnectCall> {
        self.inner.lock().connect_calls.clone()
    }

    pub fn disconnect_calls(&self) -> u32 {
        self.inner.lock().disconnect_calls
    }

    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.inner.lock().published.clone()
    }

    pub fn chat_lines(&self) -> Vec<String> {
        self.inner.lock().chat.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }
}

#[async_trait]
impl RoomClient for MemoryRoomClient {
    async fn connect(&self, room_name: &str, identity: &AgentIdentity) -> Result<(), RoomError> {
        let mut inner = self.inner.lock();
        inner.connected = true;
        inner.connect_calls.push(ConnectCall {
            room_name: room_name.to_string(),
            identity: identity.clone(),
        });
        Ok(())
    }

    async fn subscribe_audio_tracks(&self) -> Result<mpsc::Receiver<TrackSubscription>, RoomError> {
        self.inner
            .lock()
            .track_rx
            .take()
            .ok_or_else(|| RoomError::PublishFailed("audio track stream already subscribed".to_string()))
    }

    async fn subscribe_data_messages(&self, _topic: &str) -> Result<mpsc::Receiver<Vec<u8>>, RoomError> {
        self.inner
            .lock()
            .data_rx
            .take()
            .ok_or_else(|| RoomError::PublishFailed("data message stream already subscribed".to_string()))
    }

    async fn disconnect(&self) -> Result<(), RoomError> {
        let mut inner = self.inner.lock();
        inner.connected = false;
        inner.disconnect_calls += 1;
        Ok(())
    }
}

#[async_trait]
impl DataPublisher for MemoryRoomClient {
    async fn publish_data(&self, topic: &str, payload: Vec<u8>, _reliable: bool) -> Result<(), RoomError> {
        self.inner.lock().published.push((topic.to_string(), payload));
        Ok(())
    }

    async fn send_chat(&self, line: &str) -> Result<(), RoomError> {
        self.inner.lock().chat.push(line.to_string());
        Ok(())
    }
}
