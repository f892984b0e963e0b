//! The per-speaker sentence state machine itself, with all timing
//! decisions expressed as plain return values so the scheduling (actual
//! `tokio::time::sleep`s) lives entirely in [`crate::actor`] and this type
//! stays trivially unit-testable.

use std::collections::HashSet;
use std::time::Duration;

use crate::merge;

const STRONG_END_CHARS: &[char] = &['.', '!', '?', '…', ')', ']', '"', '。', '！', '？'];

#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub weak_end_words: HashSet<String>,
    pub punct_grace: Duration,
    pub pause_final: Duration,
    pub min_chars_for_final: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            weak_end_words: [
                "doing", "going", "is", "are", "was", "were", "about", "with", "to", "for", "like",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            punct_grace: Duration::from_millis(900),
            pause_final: Duration::from_millis(2500),
            min_chars_for_final: 24,
        }
    }
}

/// A published caption for this speaker: either an interim (`is_final =
/// false`, buffer and id retained) or a final (buffer and id cleared
/// immediately after).
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub text: String,
    pub sentence_id: u64,
    pub is_final: bool,
}

/// What the caller (the async actor) should do with its pause/finalize
/// timers after an `append`. Both timers are always reset on append per
/// spec §4.6 steps 4 and 6; `arm_finalize` additionally tells the caller
/// whether the freshly-merged buffer now qualifies for a grace-delayed
/// finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    pub arm_finalize: bool,
}

/// Per-speaker sentence assembly state. One instance per `SpeakerId`,
/// touched only by that speaker's pipeline/actor task.
#[derive(Debug, Default)]
pub struct SentenceAssembler {
    cfg_weak_end_words: HashSet<String>,
    punct_grace: Duration,
    pause_final: Duration,
    min_chars_for_final: usize,

    buffer: String,
    sentence_id: Option<u64>,
    next_sentence_id: u64,
    last_interim_text: Option<String>,
}

impl SentenceAssembler {
    pub fn new(cfg: AssemblerConfig) -> Self {
        Self {
            cfg_weak_end_words: cfg.weak_end_words,
            punct_grace: cfg.punct_grace,
            pause_final: cfg.pause_final,
            min_chars_for_final: cfg.min_chars_for_final,
            buffer: String::new(),
            sentence_id: None,
            next_sentence_id: 0,
            last_interim_text: None,
        }
    }

    pub fn pause_final_duration(&self) -> Duration {
        self.pause_final
    }

    pub fn punct_grace_duration(&self) -> Duration {
        self.punct_grace
    }

    pub fn has_pending_content(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Strong-ending check per §4.6 step 5: strong terminal punctuation,
    /// last word not in the weak-end set, and long enough to qualify.
    fn qualifies_for_punct_final(&self) -> bool {
        if self.buffer.chars().count() < self.min_chars_for_final {
            return false;
        }
        let Some(last_char) = self.buffer.trim_end().chars().last() else {
            return false;
        };
        if !STRONG_END_CHARS.contains(&last_char) {
            return false;
        }
        let last_word = merge::normalize(&self.buffer)
            .rsplit(' ')
            .next()
            .unwrap_or("")
            .to_string();
        !self.cfg_weak_end_words.contains(&last_word)
    }

    fn allocate_sentence_id(&mut self) -> u64 {
        *self.sentence_id.get_or_insert_with(|| {
            self.next_sentence_id += 1;
            self.next_sentence_id
        })
    }

    /// Merges a newly-accepted transcript slice into the buffer. Always
    /// cancels and reschedules the pause timer and cancels any pending
    /// finalize timer; the returned `arm_finalize` tells the caller
    /// whether to arm a fresh one.
    pub fn append(&mut self, slice: &str) -> AppendOutcome {
        self.buffer = merge::merge(&self.buffer, slice).trim().to_string();
        AppendOutcome {
            arm_finalize: self.qualifies_for_punct_final(),
        }
    }

    /// Publishes the current buffer, if any. `is_final = true` clears the
    /// buffer and sentence id immediately after (translation dispatch, if
    /// any, is the caller's responsibility once it observes `is_final`).
    /// `is_final = false` retains both so subsequent appends extend the
    /// same sentence; a repeated identical interim is suppressed.
    pub fn flush(&mut self, is_final: bool) -> Option<Emission> {
        if self.buffer.is_empty() {
            return None;
        }

        if !is_final {
            if self.last_interim_text.as_deref() == Some(self.buffer.as_str()) {
                return None;
            }
        }

        let sentence_id = self.allocate_sentence_id();
        let text = self.buffer.clone();

        if is_final {
            self.buffer.clear();
            self.sentence_id = None;
            self.last_interim_text = None;
        } else {
            self.last_interim_text = Some(text.clone());
        }

        Some(Emission {
            text,
            sentence_id,
            is_final,
        })
    }
}
