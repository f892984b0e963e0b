//! Process-wide state shared across every HTTP handler: the active-room
//! registry, the shared STT/LLM clients (spec.md §5: "the STT and LLM
//! clients are shared across speakers and must support concurrent
//! calls"), and the room-client factory each `/start` call uses to join a
//! fresh room.

use std::sync::Arc;

use captions_foundation::AgentConfig;
use captions_publish::DataPublisher;
use captions_room::{RoomClient, UnavailableRoomClient};
use captions_stt::SttClient;
use captions_session::SessionManager;
use captions_translate::Translator;

/// Builds the pair of trait objects `/start` needs for a newly joined
/// room: the `RoomClient` the orchestrator drives, and the `DataPublisher`
/// the outbound publisher writes through. These are almost always the
/// same underlying object (one conferencing-room connection serves both
/// roles); the factory returns two handles onto it so the orchestrator
/// and publisher don't need to agree on a common supertrait-object cast.
pub trait RoomFactory: Send + Sync {
    fn build(&self, room_name: &str) -> (Arc<dyn RoomClient>, Arc<dyn DataPublisher>);
}

/// Default factory for deployments that have not wired in a real
/// conferencing SDK (see [`captions_room::UnavailableRoomClient`]).
pub struct UnconfiguredRoomFactory;

impl RoomFactory for UnconfiguredRoomFactory {
    fn build(&self, _room_name: &str) -> (Arc<dyn RoomClient>, Arc<dyn DataPublisher>) {
        let client = Arc::new(UnavailableRoomClient);
        (client.clone(), client)
    }
}

pub struct AppState {
    pub manager: SessionManager,
    pub stt: Arc<dyn SttClient>,
    pub translator: Arc<dyn Translator>,
    pub config: AgentConfig,
    pub room_factory: Arc<dyn RoomFactory>,
}

impl AppState {
    pub fn new(
        stt: Arc<dyn SttClient>,
        translator: Arc<dyn Translator>,
        config: AgentConfig,
        room_factory: Arc<dyn RoomFactory>,
    ) -> Self {
        Self {
            manager: SessionManager::new(),
            stt,
            translator,
            config,
            room_factory,
        }
    }
}
