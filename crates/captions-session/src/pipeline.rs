//! The per-speaker audio pipeline task: C3 (frame aggregation) -> C4 (STT)
//! -> C5 (filter gate) -> C6 (append into the sentence actor). C6's own
//! actor owns C7/C8 (translation dispatch and publication happen there,
//! on finalize).

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use captions_audio::{AudioFrame, FrameAggregator, FrameAggregatorConfig};
use captions_filter::{FilterGate, FilterGateConfig};
use captions_foundation::{LanguageDefaults, PrefsStore, SpeakerId};
use captions_sentence::SentenceAssemblerHandle;
use captions_stt::SttClient;
use captions_telemetry::PipelineMetrics;

pub struct SpeakerPipelineArgs {
    pub speaker: SpeakerId,
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: mpsc::Receiver<AudioFrame>,
    pub stt: Arc<dyn SttClient>,
    pub prefs: PrefsStore,
    pub language_defaults: LanguageDefaults,
    pub aggregator_cfg: FrameAggregatorConfig,
    pub filter_cfg: FilterGateConfig,
    pub sentence: SentenceAssemblerHandle,
    pub metrics: Option<PipelineMetrics>,
}

/// Spawns the pipeline task for one subscribed audio track. The task
/// exits once `frames` is closed (track unsubscribed) or dropped (the
/// orchestrator tears it down on stop). It performs no final flush itself
/// — that is the orchestrator's responsibility via the shared
/// `SentenceAssemblerHandle`.
pub fn spawn(args: SpeakerPipelineArgs) -> JoinHandle<()> {
    tokio::spawn(async move {
        let SpeakerPipelineArgs {
            speaker,
            sample_rate,
            channels,
            mut frames,
            stt,
            prefs,
            language_defaults,
            aggregator_cfg,
            filter_cfg,
            sentence,
            metrics,
        } = args;

        if let Some(metrics) = &metrics {
            metrics.speaker_attached();
        }

        let mut aggregator = FrameAggregator::new(aggregator_cfg, sample_rate, channels);
        if let Some(metrics) = metrics.clone() {
            aggregator = aggregator.with_metrics(metrics);
        }
        let mut filter = FilterGate::new(filter_cfg);

        while let Some(frame) = frames.recv().await {
            let Some(window) = aggregator.push_frame(&frame, false) else {
                continue;
            };

            // Resolved fresh per window, not captured once at subscribe time, so a
            // `language_prefs` update received mid-session takes effect on the next
            // window rather than only for sentences started after a re-subscribe.
            let (stt_language, _) = prefs.resolve(&speaker, &language_defaults);
            let started = Instant::now();
            let transcript = stt.transcribe(&window, stt_language.as_deref()).await;
            if let Some(metrics) = &metrics {
                metrics.record_stt_call(started.elapsed(), transcript.is_err());
            }

            let text = match transcript {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(speaker = %speaker, error = %err, "stt call failed, dropping window");
                    continue;
                }
            };

            match filter.evaluate(&text, window.rms, Instant::now()) {
                Ok(()) => sentence.append(text).await,
                Err(reason) => {
                    if let Some(metrics) = &metrics {
                        metrics.record_filter_rejected();
                    }
                    tracing::trace!(speaker = %speaker, ?reason, "transcript slice rejected by filter gate");
                }
            }
        }

        if let Some(metrics) = &metrics {
            metrics.speaker_detached();
        }
        tracing::debug!(speaker = %speaker, "speaker pipeline task exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use captions_audio::AudioWindow;
    use captions_foundation::error::{LlmError, SttError};
    use captions_foundation::ParticipantPrefs;
    use captions_publish::OutboundPublisher;
    use captions_room::MemoryRoomClient;
    use captions_sentence::{AssemblerConfig, SpawnArgs};
    use captions_translate::{TranslationDispatcher, Translator};

    struct RecordingStt {
        seen: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl SttClient for RecordingStt {
        async fn transcribe(&self, _window: &AudioWindow, language: Option<&str>) -> Result<String, SttError> {
            self.seen.lock().push(language.map(|s| s.to_string()));
            Ok("hello world".to_string())
        }
    }

    struct StubTranslator;

    #[async_trait]
    impl Translator for StubTranslator {
        async fn translate(&self, text: &str, _target_language: &str) -> Result<String, LlmError> {
            Ok(text.to_string())
        }
    }

    fn loud_frame(n: usize) -> AudioFrame {
        AudioFrame {
            sample_rate: 16_000,
            channels: 1,
            duration: Duration::from_millis(100),
            samples: (0..n).map(|i| if i % 2 == 0 { 20_000 } else { -20_000 }).collect(),
        }
    }

    /// Guards against the pipeline capturing the session-default STT
    /// language once at subscribe time: a `language_prefs` override that
    /// arrives mid-session must be used as the hint for the very next
    /// recognition window, same as `captions_sentence::actor` already
    /// resolves `recognition_lang` fresh for each finalized sentence.
    #[tokio::test]
    async fn stt_language_is_resolved_per_window_not_captured_once() {
        let speaker = SpeakerId::new("p1");
        let prefs = PrefsStore::new();
        let language_defaults = LanguageDefaults {
            stt_language: Some("en".to_string()),
            target_language: None,
        };

        let (room, _handles) = MemoryRoomClient::new();
        let room = Arc::new(room);
        let publisher = Arc::new(OutboundPublisher::new(room.clone(), false));
        let dispatcher = Arc::new(TranslationDispatcher::new(Arc::new(StubTranslator), publisher.clone()));

        let (sentence, _sentence_task) = captions_sentence::spawn(SpawnArgs {
            speaker: speaker.clone(),
            config: AssemblerConfig::default(),
            publisher,
            translation: dispatcher,
            prefs: prefs.clone(),
            language_defaults: language_defaults.clone(),
            metrics: None,
        });

        let stt = Arc::new(RecordingStt { seen: Mutex::new(Vec::new()) });
        let (frame_tx, frame_rx) = mpsc::channel(4);

        let pipeline = spawn(SpeakerPipelineArgs {
            speaker: speaker.clone(),
            sample_rate: 16_000,
            channels: 1,
            frames: frame_rx,
            stt: stt.clone(),
            prefs: prefs.clone(),
            language_defaults,
            aggregator_cfg: FrameAggregatorConfig {
                target_ms: 100,
                overlap_ms: 20,
                vad_threshold: 800.0,
            },
            filter_cfg: FilterGateConfig::default(),
            sentence,
            metrics: None,
        });

        // First window: no participant override yet, uses the session default.
        frame_tx.send(loud_frame(1600)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // A `language_prefs` update arrives mid-session.
        prefs.upsert(
            speaker.clone(),
            ParticipantPrefs {
                stt_language: Some("fr".to_string()),
                target_language: None,
            },
        );

        // Second window must pick up the override immediately.
        frame_tx.send(loud_frame(1600)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(frame_tx);
        pipeline.await.unwrap();

        let seen = stt.seen.lock().clone();
        assert_eq!(seen, vec![Some("en".to_string()), Some("fr".to_string())]);
    }
}
