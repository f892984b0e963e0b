//! Shared, room-wide per-participant language preferences.
//!
//! Single writer: the data-channel handler that receives `language_prefs`
//! messages. Many readers: every per-speaker pipeline resolves its own
//! entry on each finalized sentence. No per-key locking is needed because
//! `parking_lot::RwLock` guards the whole map and reads are cheap clones.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{ParticipantPrefs, SpeakerId};

#[derive(Clone, Default)]
pub struct PrefsStore {
    inner: Arc<RwLock<HashMap<SpeakerId, ParticipantPrefs>>>,
}

impl PrefsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, speaker: SpeakerId, prefs: ParticipantPrefs) {
        self.inner.write().insert(speaker, prefs);
    }

    pub fn get(&self, speaker: &SpeakerId) -> Option<ParticipantPrefs> {
        self.inner.read().get(speaker).cloned()
    }

    pub fn remove(&self, speaker: &SpeakerId) {
        self.inner.write().remove(speaker);
    }
}

/// Resolves a speaker's effective STT and target language, falling back to
/// session defaults when no per-participant override is set.
#[derive(Clone)]
pub struct LanguageDefaults {
    pub stt_language: Option<String>,
    pub target_language: Option<String>,
}

impl PrefsStore {
    pub fn resolve(&self, speaker: &SpeakerId, defaults: &LanguageDefaults) -> (Option<String>, Option<String>) {
        let prefs = self.get(speaker);
        let stt = prefs
            .as_ref()
            .and_then(|p| p.stt_language.clone())
            .or_else(|| defaults.stt_language.clone());
        let target = prefs
            .as_ref()
            .and_then(|p| p.target_language.clone())
            .or_else(|| defaults.target_language.clone());
        (stt, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_entry_falls_back_to_defaults() {
        let store = PrefsStore::new();
        let defaults = LanguageDefaults {
            stt_language: Some("en".to_string()),
            target_language: Some("es".to_string()),
        };
        let (stt, target) = store.resolve(&SpeakerId::new("p1"), &defaults);
        assert_eq!(stt.as_deref(), Some("en"));
        assert_eq!(target.as_deref(), Some("es"));
    }

    #[test]
    fn participant_override_takes_precedence() {
        let store = PrefsStore::new();
        store.upsert(
            SpeakerId::new("p1"),
            ParticipantPrefs {
                stt_language: None,
                target_language: Some("fr".to_string()),
            },
        );
        let defaults = LanguageDefaults {
            stt_language: Some("en".to_string()),
            target_language: Some("es".to_string()),
        };
        let (stt, target) = store.resolve(&SpeakerId::new("p1"), &defaults);
        assert_eq!(stt.as_deref(), Some("en"), "unset override field falls back to default");
        assert_eq!(target.as_deref(), Some("fr"), "set override field wins");
    }
}
