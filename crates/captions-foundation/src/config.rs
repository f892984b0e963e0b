//! Process configuration, read from the environment per the table in the
//! external-interfaces spec. Mirrors the teacher's habit of reading
//! individual `env::var`s with hardcoded defaults rather than a layered
//! config-file builder (see `coldvox_app`'s `main.rs`); the `config` crate
//! is used only for its `ConfigError` type (see `error.rs`).

use std::time::Duration;

use crate::error::ConfigError;

fn default_weak_end_words() -> Vec<String> {
    [
        "doing", "going", "is", "are", "was", "were", "about", "with", "to", "for", "like",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Process-wide tunables for the captioning pipeline. One instance is
/// loaded at startup and shared (by value, it is `Clone`) across every
/// room session and per-speaker pipeline; none of it is mutated after
/// load.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// C3 frame aggregator target window size.
    pub buffer_target_ms: u64,
    /// C3 frame aggregator trailing-tail overlap.
    pub overlap_ms: u64,
    /// C3 frame aggregator RMS gate.
    pub vad_threshold: f64,
    /// C5 filter gate high-energy threshold for short repeats.
    pub short_high_rms: f64,
    /// C5 filter gate recency window for repeat suppression.
    pub repeat_window_ms: u64,
    /// C5 filter gate exact-match blocklist, comma-separated in the
    /// environment and split/lowercased at load time.
    pub blocklist_phrases: Vec<String>,
    /// C6 sentence assembler weak sentence-end terminators.
    pub weak_end_words: Vec<String>,
    /// C6 sentence assembler finalize-grace delay after strong punctuation.
    pub punct_grace_ms: u64,
    /// C6 sentence assembler pause-triggered flush delay.
    pub pause_final_ms: u64,
    /// C6 sentence assembler minimum buffer length to qualify for a
    /// punctuation-triggered final.
    pub min_chars_for_final: usize,
    /// C4 STT client adapter model id.
    pub openai_stt_model: String,
    /// C8 outbound publisher chat-mirror toggle.
    pub agent_send_chat: bool,
    /// Default STT language hint, absent unless configured.
    pub stt_language: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            buffer_target_ms: 1800,
            overlap_ms: 300,
            vad_threshold: 800.0,
            short_high_rms: 1200.0,
            repeat_window_ms: 7000,
            blocklist_phrases: Vec::new(),
            weak_end_words: default_weak_end_words(),
            punct_grace_ms: 900,
            pause_final_ms: 2500,
            min_chars_for_final: 24,
            openai_stt_model: "gpt-4o-transcribe".to_string(),
            agent_send_chat: false,
            stt_language: None,
        }
    }
}

impl AgentConfig {
    /// Loads configuration from the process environment, falling back to
    /// spec defaults for anything unset. Numeric overrides that fail to
    /// parse are reported as `ConfigError::Validation` rather than
    /// silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let buffer_target_ms = parse_env_or("BUFFER_TARGET_MS", defaults.buffer_target_ms)?;
        let overlap_ms = parse_env_or("OVERLAP_MS", defaults.overlap_ms)?;
        let vad_threshold = parse_env_or("VAD_THRESHOLD", defaults.vad_threshold)?;
        let short_high_rms = parse_env_or("SHORT_HIGH_RMS", defaults.short_high_rms)?;
        let repeat_window_ms = parse_env_or("REPEAT_WINDOW_MS", defaults.repeat_window_ms)?;
        let punct_grace_ms = parse_env_or("PUNCT_GRACE_MS", defaults.punct_grace_ms)?;
        let pause_final_ms = parse_env_or("PAUSE_FINAL_MS", defaults.pause_final_ms)?;
        let min_chars_for_final = parse_env_or("MIN_CHARS_FOR_FINAL", defaults.min_chars_for_final)?;
        let agent_send_chat = parse_env_or("AGENT_SEND_CHAT", defaults.agent_send_chat)?;

        let blocklist_phrases = std::env::var("BLOCKLIST_PHRASES")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let weak_end_words = std::env::var("WEAK_END_WORDS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(default_weak_end_words);

        let openai_stt_model =
            std::env::var("OPENAI_STT_MODEL").unwrap_or(defaults.openai_stt_model);
        let stt_language = std::env::var("STT_LANGUAGE").ok();

        Ok(Self {
            buffer_target_ms,
            overlap_ms,
            vad_threshold,
            short_high_rms,
            repeat_window_ms,
            blocklist_phrases,
            weak_end_words,
            punct_grace_ms,
            pause_final_ms,
            min_chars_for_final,
            openai_stt_model,
            agent_send_chat,
            stt_language,
        })
    }

    pub fn repeat_window(&self) -> Duration {
        Duration::from_millis(self.repeat_window_ms)
    }

    pub fn punct_grace(&self) -> Duration {
        Duration::from_millis(self.punct_grace_ms)
    }

    pub fn pause_final(&self) -> Duration {
        Duration::from_millis(self.pause_final_ms)
    }
}

fn parse_env_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse::<T>().map_err(|e| ConfigError::Validation {
            field: name.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.buffer_target_ms, 1800);
        assert_eq!(cfg.overlap_ms, 300);
        assert_eq!(cfg.vad_threshold, 800.0);
        assert_eq!(cfg.short_high_rms, 1200.0);
        assert_eq!(cfg.repeat_window_ms, 7000);
        assert_eq!(cfg.punct_grace_ms, 900);
        assert_eq!(cfg.pause_final_ms, 2500);
        assert_eq!(cfg.min_chars_for_final, 24);
        assert!(!cfg.agent_send_chat);
        assert!(cfg.weak_end_words.contains(&"going".to_string()));
    }

    #[test]
    #[serial]
    fn blocklist_csv_is_split_trimmed_and_lowercased() {
        std::env::set_var("BLOCKLIST_PHRASES", " Thanks for watching , [MUSIC] ");
        let cfg = AgentConfig::from_env().unwrap();
        assert_eq!(
            cfg.blocklist_phrases,
            vec!["thanks for watching".to_string(), "[music]".to_string()]
        );
        std::env::remove_var("BLOCKLIST_PHRASES");
    }

    #[test]
    #[serial]
    fn invalid_numeric_override_is_a_validation_error() {
        std::env::set_var("VAD_THRESHOLD", "not-a-number");
        let result = AgentConfig::from_env();
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
        std::env::remove_var("VAD_THRESHOLD");
    }
}
