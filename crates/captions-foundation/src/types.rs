//! Shared identity and preference types threaded through every crate in
//! the captioning pipeline.

use std::fmt;

/// Opaque stable identifier for a remote participant, supplied by the
/// conferencing layer. Cheap to clone and hash; used as the map key for
/// per-speaker state everywhere (`SentenceState`, `FrameAggregator`,
/// `FilterGate` instances, `ParticipantPrefs`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeakerId(pub String);

impl SpeakerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SpeakerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SpeakerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Per-participant overrides received over the data channel. Absent fields
/// fall back to the session's default STT/target language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantPrefs {
    pub stt_language: Option<String>,
    pub target_language: Option<String>,
}
