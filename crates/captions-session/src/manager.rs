//! Process-wide `activeRooms` registry behind a single async mutex, used
//! by the control surface's `/start`, `/stop`, and `/sessions` handlers.

use std::collections::HashMap;

use tokio::sync::Mutex;

use captions_foundation::error::RoomError;

use crate::orchestrator::{self, ConnectArgs, RoomSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Owns every currently-connected room session. `/start` and `/stop` are
/// idempotent per spec.md §6/§7: starting an already-running room or
/// stopping one that isn't running is a success, not an error.
#[derive(Default)]
pub struct SessionManager {
    active: Mutex<HashMap<String, RoomSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&self, args: ConnectArgs) -> Result<StartOutcome, RoomError> {
        let room_name = args.room_name.clone();
        let mut active = self.active.lock().await;
        if active.contains_key(&room_name) {
            return Ok(StartOutcome::AlreadyRunning);
        }

        // Connect before inserting: a failed connect must not leave a
        // half-initialized session in the active map (spec.md §7).
        let session = orchestrator::connect(args).await?;
        active.insert(room_name, session);
        Ok(StartOutcome::Started)
    }

    pub async fn stop(&self, room_name: &str) -> StopOutcome {
        let session = self.active.lock().await.remove(room_name);
        match session {
            Some(session) => {
                session.stop();
                session.join().await;
                StopOutcome::Stopped
            }
            None => StopOutcome::NotRunning,
        }
    }

    pub async fn active_rooms(&self) -> Vec<String> {
        self.active.lock().await.keys().cloned().collect()
    }
}
