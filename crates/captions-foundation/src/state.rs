use crate::error::CaptionsError;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;

/// Lifecycle of a single room session, driven by the control surface's
/// `/start` and `/stop` endpoints and the orchestrator's shutdown flush.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Connecting,
    Running,
    Stopping,
    Stopped,
}

pub struct StateManager {
    state: Arc<RwLock<SessionState>>,
    state_tx: Sender<SessionState>,
    state_rx: Receiver<SessionState>,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager {
    pub fn new() -> Self {
        let (state_tx, state_rx) = crossbeam_channel::unbounded();
        Self {
            state: Arc::new(RwLock::new(SessionState::Connecting)),
            state_tx,
            state_rx,
        }
    }

    pub fn transition(&self, new_state: SessionState) -> Result<(), CaptionsError> {
        let mut current = self.state.write();

        let valid = matches!(
            (&*current, &new_state),
            (SessionState::Connecting, SessionState::Running)
                | (SessionState::Running, SessionState::Stopping)
                | (SessionState::Stopping, SessionState::Stopped)
        );

        if !valid {
            return Err(CaptionsError::Fatal(format!(
                "invalid session state transition: {current:?} -> {new_state:?}"
            )));
        }

        tracing::info!("session state transition: {:?} -> {:?}", *current, new_state);
        *current = new_state.clone();
        let _ = self.state_tx.send(new_state);
        Ok(())
    }

    pub fn current(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn subscribe(&self) -> Receiver<SessionState> {
        self.state_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions_succeed() {
        let mgr = StateManager::new();
        assert!(mgr.transition(SessionState::Running).is_ok());
        assert!(mgr.transition(SessionState::Stopping).is_ok());
        assert!(mgr.transition(SessionState::Stopped).is_ok());
    }

    #[test]
    fn skipping_a_state_fails() {
        let mgr = StateManager::new();
        assert!(mgr.transition(SessionState::Stopped).is_err());
        assert_eq!(mgr.current(), SessionState::Connecting);
    }
}
