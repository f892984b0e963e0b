//! Fixed-duration audio frames -> overlap-prepended recognition windows.
//!
//! One [`FrameAggregator`] is owned by a single per-speaker pipeline task:
//! no state here is shared across speakers, so the aggregator itself holds
//! no locks.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::signal::rms;
use captions_telemetry::{PipelineMetrics, WindowDrop};

/// One fixed-cadence chunk of audio handed up by the conferencing SDK for a
/// subscribed remote track. Immutable once received.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration: Duration,
}

/// A target-sized, overlap-prepended PCM16 buffer ready for STT submission.
#[derive(Debug, Clone)]
pub struct AudioWindow {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    pub emitted_at: Instant,
    pub rms: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameAggregatorConfig {
    pub target_ms: u64,
    pub overlap_ms: u64,
    pub vad_threshold: f64,
}

impl Default for FrameAggregatorConfig {
    fn default() -> Self {
        Self {
            target_ms: 1800,
            overlap_ms: 300,
            vad_threshold: 800.0,
        }
    }
}

/// Collects frames for one track into overlap-prepended windows, dropping
/// windows that are muted or below the VAD energy gate.
pub struct FrameAggregator {
    cfg: FrameAggregatorConfig,
    sample_rate: u32,
    channels: u16,
    buffer: VecDeque<i16>,
    prev_tail: Vec<i16>,
    metrics: Option<PipelineMetrics>,
}

impl FrameAggregator {
    pub fn new(cfg: FrameAggregatorConfig, sample_rate: u32, channels: u16) -> Self {
        Self {
            cfg,
            sample_rate,
            channels,
            buffer: VecDeque::new(),
            prev_tail: Vec::new(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn samples_for_ms(&self, ms: u64) -> usize {
        (self.sample_rate as u64 * self.channels as u64 * ms / 1000) as usize
    }

    /// Feed one frame in. Returns an emitted window once enough audio has
    /// accumulated and it clears the VAD gate; `None` otherwise (still
    /// accumulating, muted, or dropped as sub-threshold).
    pub fn push_frame(&mut self, frame: &AudioFrame, muted: bool) -> Option<AudioWindow> {
        if muted {
            self.buffer.clear();
            self.prev_tail.clear();
            return None;
        }

        self.buffer.extend(frame.samples.iter().copied());

        let target_samples = self.samples_for_ms(self.cfg.target_ms);
        if self.buffer.len() < target_samples {
            return None;
        }

        let mut combined: Vec<i16> = self.buffer.drain(..).collect();

        let mut windowed = Vec::with_capacity(self.prev_tail.len() + combined.len());
        windowed.extend_from_slice(&self.prev_tail);
        windowed.append(&mut combined);

        let tail_samples = self.samples_for_ms(self.cfg.overlap_ms).min(windowed.len());
        self.prev_tail = windowed[windowed.len() - tail_samples..].to_vec();

        let energy = rms(&windowed);

        if let Some(metrics) = &self.metrics {
            metrics.record_window(if energy < self.cfg.vad_threshold {
                Some(WindowDrop::Vad)
            } else {
                None
            });
        }

        if energy < self.cfg.vad_threshold {
            tracing::trace!(rms = energy, threshold = self.cfg.vad_threshold, "window below vad gate");
            return None;
        }

        tracing::trace!(samples = windowed.len(), rms = energy, "emitting recognition window");
        Some(AudioWindow {
            samples: windowed,
            sample_rate: self.sample_rate,
            channels: self.channels,
            emitted_at: Instant::now(),
            rms: energy,
        })
    }
}
