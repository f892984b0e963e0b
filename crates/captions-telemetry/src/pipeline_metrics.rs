use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared, cross-task counters for one room's captioning pipeline.
///
/// One instance is created per room and cloned into every per-speaker
/// pipeline task plus the orchestrator, so `Arc` clones share the same
/// underlying atomics.
#[derive(Clone)]
pub struct PipelineMetrics {
    // Frame aggregator
    pub windows_emitted: Arc<AtomicU64>,
    pub windows_dropped_vad: Arc<AtomicU64>,
    pub windows_dropped_muted: Arc<AtomicU64>,

    // STT client adapter
    pub stt_requests: Arc<AtomicU64>,
    pub stt_failures: Arc<AtomicU64>,
    pub stt_last_latency_ms: Arc<AtomicU64>,

    // Filter & dedup gate
    pub filter_rejected: Arc<AtomicU64>,

    // Sentence assembler
    pub interim_emitted: Arc<AtomicU64>,
    pub final_emitted: Arc<AtomicU64>,

    // Translation dispatcher
    pub translation_requests: Arc<AtomicU64>,
    pub translation_failures: Arc<AtomicU64>,

    // Outbound publisher
    pub publish_success: Arc<AtomicU64>,
    pub publish_failures: Arc<AtomicU64>,

    // Active per-speaker pipelines for this room
    pub active_speakers: Arc<AtomicUsize>,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self {
            windows_emitted: Arc::new(AtomicU64::new(0)),
            windows_dropped_vad: Arc::new(AtomicU64::new(0)),
            windows_dropped_muted: Arc::new(AtomicU64::new(0)),
            stt_requests: Arc::new(AtomicU64::new(0)),
            stt_failures: Arc::new(AtomicU64::new(0)),
            stt_last_latency_ms: Arc::new(AtomicU64::new(0)),
            filter_rejected: Arc::new(AtomicU64::new(0)),
            interim_emitted: Arc::new(AtomicU64::new(0)),
            final_emitted: Arc::new(AtomicU64::new(0)),
            translation_requests: Arc::new(AtomicU64::new(0)),
            translation_failures: Arc::new(AtomicU64::new(0)),
            publish_success: Arc::new(AtomicU64::new(0)),
            publish_failures: Arc::new(AtomicU64::new(0)),
            active_speakers: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_window(&self, dropped: Option<WindowDrop>) {
        match dropped {
            None => {
                self.windows_emitted.fetch_add(1, Ordering::Relaxed);
            }
            Some(WindowDrop::Vad) => {
                self.windows_dropped_vad.fetch_add(1, Ordering::Relaxed);
            }
            Some(WindowDrop::Muted) => {
                self.windows_dropped_muted.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn record_stt_call(&self, latency: Duration, failed: bool) {
        self.stt_requests.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.stt_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.stt_last_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_filter_rejected(&self) {
        self.filter_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_emission(&self, is_final: bool) {
        if is_final {
            self.final_emitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.interim_emitted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_translation(&self, failed: bool) {
        self.translation_requests.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.translation_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_publish(&self, failed: bool) {
        if failed {
            self.publish_failures.fetch_add(1, Ordering::Relaxed);
        } else {
            self.publish_success.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn speaker_attached(&self) {
        self.active_speakers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn speaker_detached(&self) {
        self.active_speakers.fetch_sub(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum WindowDrop {
    Vad,
    Muted,
}

/// Rolling frames/sec tracker, ticked once per emitted unit.
#[derive(Debug)]
pub struct FpsTracker {
    last_update: Instant,
    count: u64,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            count: 0,
        }
    }

    pub fn tick(&mut self) -> Option<f64> {
        self.count += 1;
        let elapsed = self.last_update.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = self.count as f64 / elapsed.as_secs_f64();
            self.last_update = Instant::now();
            self.count = 0;
            Some(fps)
        } else {
            None
        }
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}
