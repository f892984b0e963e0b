//! Wire-level caption/translation records published on the conference's
//! `captions` data-channel topic.

use captions_foundation::SpeakerId;
use serde::{Deserialize, Serialize};

/// One outbound record: either an interim/final transcription update, or a
/// translation tied to a transcription's `final=true` emission. Serializes
/// to exactly the two shapes documented as the outbound wire contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CaptionRecord {
    #[serde(rename = "transcription")]
    Transcription {
        speaker: String,
        text: String,
        #[serde(rename = "sentenceId")]
        sentence_id: u64,
        #[serde(rename = "final")]
        is_final: bool,
        timestamp: i64,
    },
    #[serde(rename = "translation")]
    Translation {
        speaker: String,
        #[serde(rename = "originalText")]
        original_text: String,
        #[serde(rename = "translatedText")]
        translated_text: String,
        #[serde(rename = "targetLanguage")]
        target_language: String,
        #[serde(rename = "sentenceId")]
        sentence_id: u64,
        timestamp: i64,
    },
}

impl CaptionRecord {
    pub fn transcription(
        speaker: &SpeakerId,
        text: impl Into<String>,
        sentence_id: u64,
        is_final: bool,
        timestamp: i64,
    ) -> Self {
        CaptionRecord::Transcription {
            speaker: speaker.as_str().to_string(),
            text: text.into(),
            sentence_id,
            is_final,
            timestamp,
        }
    }

    pub fn translation(
        speaker: &SpeakerId,
        original_text: impl Into<String>,
        translated_text: impl Into<String>,
        target_language: impl Into<String>,
        sentence_id: u64,
        timestamp: i64,
    ) -> Self {
        CaptionRecord::Translation {
            speaker: speaker.as_str().to_string(),
            original_text: original_text.into(),
            translated_text: translated_text.into(),
            target_language: target_language.into(),
            sentence_id,
            timestamp,
        }
    }

    pub fn sentence_id(&self) -> u64 {
        match self {
            CaptionRecord::Transcription { sentence_id, .. } => *sentence_id,
            CaptionRecord::Translation { sentence_id, .. } => *sentence_id,
        }
    }

    /// Renders the record the way `AGENT_SEND_CHAT` mirrors it as a plain
    /// chat line, e.g. `"[Transcript] alice: hello there"`.
    pub fn as_chat_line(&self) -> String {
        match self {
            CaptionRecord::Transcription { speaker, text, .. } => {
                format!("[Transcript] {speaker}: {text}")
            }
            CaptionRecord::Translation {
                speaker,
                translated_text,
                ..
            } => format!("[Translation] {speaker}: {translated_text}"),
        }
    }
}

/// Unix epoch milliseconds; the process clock is the authority for wire
/// timestamps, not a virtual test clock.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcription_serializes_with_tagged_type() {
        let speaker = SpeakerId::new("p1");
        let rec = CaptionRecord::transcription(&speaker, "hello world", 1, true, 1000);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "transcription");
        assert_eq!(json["speaker"], "p1");
        assert_eq!(json["sentenceId"], 1);
        assert_eq!(json["final"], true);
    }

    #[test]
    fn translation_serializes_with_both_texts() {
        let speaker = SpeakerId::new("p1");
        let rec = CaptionRecord::translation(&speaker, "Hello.", "Hola.", "es", 1, 1000);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "translation");
        assert_eq!(json["originalText"], "Hello.");
        assert_eq!(json["translatedText"], "Hola.");
        assert_eq!(json["targetLanguage"], "es");
    }

    #[test]
    fn chat_mirror_lines_match_documented_format() {
        let speaker = SpeakerId::new("alice");
        let t = CaptionRecord::transcription(&speaker, "hello there", 1, true, 0);
        assert_eq!(t.as_chat_line(), "[Transcript] alice: hello there");

        let tr = CaptionRecord::translation(&speaker, "hello there", "hola", "es", 1, 0);
        assert_eq!(tr.as_chat_line(), "[Translation] alice: hola");
    }
}
