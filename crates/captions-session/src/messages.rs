//! Inbound data-channel messages on the `captions` topic. Only
//! `type:"language_prefs"` is acted on; every other type or a missing
//! `participantId` is ignored, per spec.md §6.

use serde::Deserialize;

use captions_foundation::{ParticipantPrefs, SpeakerId};

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "participantId")]
    participant_id: Option<String>,
    #[serde(rename = "sttLanguage")]
    stt_language: Option<String>,
    #[serde(rename = "targetLanguage")]
    target_language: Option<String>,
}

/// A parsed, actionable `language_prefs` update.
pub struct LanguagePrefsUpdate {
    pub speaker: SpeakerId,
    pub prefs: ParticipantPrefs,
}

/// Parses one inbound payload. Returns `None` for anything that isn't a
/// well-formed `language_prefs` message with a participant id, rather than
/// an error: unknown types are routine, not a failure.
pub fn parse_language_prefs(payload: &[u8]) -> Option<LanguagePrefsUpdate> {
    let raw: RawMessage = serde_json::from_slice(payload).ok()?;
    if raw.kind != "language_prefs" {
        return None;
    }
    let participant_id = raw.participant_id?;

    Some(LanguagePrefsUpdate {
        speaker: SpeakerId::new(participant_id),
        prefs: ParticipantPrefs {
            stt_language: raw.stt_language,
            target_language: raw.target_language,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_language_prefs() {
        let payload = br#"{"type":"language_prefs","participantId":"p1","sttLanguage":"en","targetLanguage":"es"}"#;
        let update = parse_language_prefs(payload).expect("should parse");
        assert_eq!(update.speaker.as_str(), "p1");
        assert_eq!(update.prefs.stt_language.as_deref(), Some("en"));
        assert_eq!(update.prefs.target_language.as_deref(), Some("es"));
    }

    #[test]
    fn unknown_type_is_ignored() {
        let payload = br#"{"type":"something_else","participantId":"p1"}"#;
        assert!(parse_language_prefs(payload).is_none());
    }

    #[test]
    fn missing_participant_id_is_ignored() {
        let payload = br#"{"type":"language_prefs","sttLanguage":"en"}"#;
        assert!(parse_language_prefs(payload).is_none());
    }

    #[test]
    fn malformed_json_is_ignored() {
        assert!(parse_language_prefs(b"not json").is_none());
    }

    #[test]
    fn partial_prefs_leave_other_field_unset() {
        let payload = br#"{"type":"language_prefs","participantId":"p2","targetLanguage":"fr"}"#;
        let update = parse_language_prefs(payload).unwrap();
        assert!(update.prefs.stt_language.is_none());
        assert_eq!(update.prefs.target_language.as_deref(), Some("fr"));
    }
}
