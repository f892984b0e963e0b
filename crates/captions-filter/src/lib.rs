//! Rejects blocklisted phrases, punctuation-only noise, and low-energy
//! short repeats before a transcript slice reaches the sentence assembler.
//!
//! One [`FilterGate`] is owned by a single speaker's pipeline task; the
//! `recent` memory it tracks is therefore a single-writer domain, same as
//! [`captions_audio::FrameAggregator`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FilterGateConfig {
    /// Case-insensitive exact-match blocklist, already lowercased.
    pub blocklist: Vec<String>,
    pub short_high_rms: f64,
    pub repeat_window: Duration,
}

impl Default for FilterGateConfig {
    fn default() -> Self {
        Self {
            blocklist: Vec::new(),
            short_high_rms: 1200.0,
            repeat_window: Duration::from_millis(7000),
        }
    }
}

impl FilterGateConfig {
    /// Parses a comma-separated `BLOCKLIST_PHRASES` value into a lowercased
    /// blocklist, trimming whitespace and dropping empty entries.
    pub fn with_blocklist_csv(mut self, csv: &str) -> Self {
        self.blocklist = csv
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }
}

#[derive(Debug, Clone)]
struct RecentMemory {
    text: String,
    at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Blocklisted,
    PunctuationOnly,
    ShortHighEnergyRepeat,
}

/// Per-speaker candidate-text gate. Accepting a text updates the recency
/// memory used to suppress short, high-energy repeats (e.g. filler sounds
/// re-recognized off the overlap tail).
pub struct FilterGate {
    cfg: FilterGateConfig,
    recent: Option<RecentMemory>,
}

impl FilterGate {
    pub fn new(cfg: FilterGateConfig) -> Self {
        Self { cfg, recent: None }
    }

    fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn has_letter_or_digit(text: &str) -> bool {
        text.chars().any(|c| c.is_alphanumeric())
    }

    /// Evaluates a candidate transcript slice against the blocklist,
    /// punctuation-noise check, and short-high-energy repeat gate. `now` is
    /// supplied by the caller so tests can drive the recency window
    /// deterministically.
    pub fn evaluate(&mut self, text: &str, rms: f64, now: Instant) -> Result<(), RejectReason> {
        let trimmed = text.trim();

        if self.cfg.blocklist.iter().any(|b| b == &trimmed.to_lowercase()) {
            return Err(RejectReason::Blocklisted);
        }

        if !Self::has_letter_or_digit(trimmed) {
            return Err(RejectReason::PunctuationOnly);
        }

        if Self::word_count(trimmed) <= 2 && rms < self.cfg.short_high_rms {
            if let Some(recent) = &self.recent {
                if recent.text == trimmed && now.saturating_duration_since(recent.at) < self.cfg.repeat_window {
                    return Err(RejectReason::ShortHighEnergyRepeat);
                }
            }
        }

        self.recent = Some(RecentMemory {
            text: trimmed.to_string(),
            at: now,
        });
        Ok(())
    }
}
