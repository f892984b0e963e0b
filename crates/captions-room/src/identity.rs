//! The agent's own participant metadata, attached at room join so other
//! participants (and the conferencing SDK's dashboards) can tell this
//! process apart from a human attendee.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentIdentity {
    pub role: String,
    pub subtype: String,
}

impl Default for AgentIdentity {
    fn default() -> Self {
        Self {
            role: "agent".to_string(),
            subtype: "captions".to_string(),
        }
    }
}
