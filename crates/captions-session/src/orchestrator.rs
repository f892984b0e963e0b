//! C9: owns one room connection, spawns one pipeline per subscribed audio
//! track, applies inbound `language_prefs` updates, and flushes every
//! in-flight sentence before tearing down on stop.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use captions_audio::FrameAggregatorConfig;
use captions_filter::FilterGateConfig;
use captions_foundation::state::{SessionState, StateManager};
use captions_foundation::{AgentConfig, LanguageDefaults, PrefsStore, SpeakerId};
use captions_publish::{DataPublisher, OutboundPublisher};
use captions_room::{AgentIdentity, RoomClient};
use captions_sentence::{AssemblerConfig, SentenceAssemblerHandle};
use captions_stt::SttClient;
use captions_telemetry::PipelineMetrics;
use captions_translate::{TranslationDispatcher, Translator};

use crate::pipeline::{self, SpeakerPipelineArgs};
use crate::stop::StopSignal;

/// Everything needed to connect and run one room's session.
pub struct ConnectArgs {
    pub room_name: String,
    pub identity: AgentIdentity,
    pub room: Arc<dyn RoomClient>,
    pub publisher_target: Arc<dyn DataPublisher>,
    pub stt: Arc<dyn SttClient>,
    pub translator: Arc<dyn Translator>,
    pub config: AgentConfig,
    pub metrics: Option<PipelineMetrics>,
    pub prefs: PrefsStore,
    pub language_defaults: LanguageDefaults,
}

/// A live, running room session. Dropping this does not stop the session;
/// call [`RoomSession::stop`] and await [`RoomSession::join`] for a
/// clean shutdown.
pub struct RoomSession {
    stop_signal: StopSignal,
    task: tokio::task::JoinHandle<()>,
    state: Arc<StateManager>,
}

impl RoomSession {
    pub fn stop(&self) {
        self.stop_signal.request();
    }

    pub async fn join(self) {
        let _ = self.task.await;
    }

    pub fn state(&self) -> SessionState {
        self.state.current()
    }
}

fn assembler_config(config: &AgentConfig) -> AssemblerConfig {
    AssemblerConfig {
        weak_end_words: config.weak_end_words.iter().cloned().collect::<HashSet<_>>(),
        punct_grace: config.punct_grace(),
        pause_final: config.pause_final(),
        min_chars_for_final: config.min_chars_for_final,
    }
}

fn aggregator_config(config: &AgentConfig) -> FrameAggregatorConfig {
    FrameAggregatorConfig {
        target_ms: config.buffer_target_ms,
        overlap_ms: config.overlap_ms,
        vad_threshold: config.vad_threshold,
    }
}

fn filter_config(config: &AgentConfig) -> FilterGateConfig {
    FilterGateConfig {
        blocklist: config.blocklist_phrases.clone(),
        short_high_rms: config.short_high_rms,
        repeat_window: config.repeat_window(),
    }
}

/// Connects to the room and spawns the orchestrator's event loop task.
/// Mirrors spec.md §7's "fatal startup" rule: a failed `connect` returns
/// the error directly and never produces a `RoomSession`.
pub async fn connect(args: ConnectArgs) -> Result<RoomSession, captions_foundation::error::RoomError> {
    args.room.connect(&args.room_name, &args.identity).await?;

    let audio_tracks = args.room.subscribe_audio_tracks().await?;
    let data_messages = args.room.subscribe_data_messages(captions_publish::CAPTIONS_TOPIC).await?;

    let state = Arc::new(StateManager::new());
    state
        .transition(SessionState::Running)
        .map_err(|e| captions_foundation::error::RoomError::ConnectFailed {
            room: args.room_name.clone(),
            reason: e.to_string(),
        })?;

    let stop_signal = StopSignal::new();
    let task_stop = stop_signal.clone();
    let task_state = state.clone();

    let publisher = Arc::new(OutboundPublisher::new(args.publisher_target, args.config.agent_send_chat));
    let dispatcher = Arc::new({
        let mut d = TranslationDispatcher::new(args.translator, publisher.clone());
        if let Some(metrics) = args.metrics.clone() {
            d = d.with_metrics(metrics);
        }
        d
    });

    let room = args.room.clone();
    let stt = args.stt.clone();
    let config = args.config.clone();
    let metrics = args.metrics.clone();
    let prefs = args.prefs.clone();
    let language_defaults = args.language_defaults.clone();

    let task = tokio::spawn(run_event_loop(
        task_stop,
        task_state,
        audio_tracks,
        data_messages,
        room,
        stt,
        publisher,
        dispatcher,
        config,
        metrics,
        prefs,
        language_defaults,
    ));

    Ok(RoomSession {
        stop_signal,
        task,
        state,
    })
}

#[allow(clippy::too_many_arguments)]
async fn run_event_loop(
    stop: StopSignal,
    state: Arc<StateManager>,
    mut audio_tracks: tokio::sync::mpsc::Receiver<captions_room::TrackSubscription>,
    mut data_messages: tokio::sync::mpsc::Receiver<Vec<u8>>,
    room: Arc<dyn RoomClient>,
    stt: Arc<dyn SttClient>,
    publisher: Arc<OutboundPublisher>,
    dispatcher: Arc<TranslationDispatcher>,
    config: AgentConfig,
    metrics: Option<PipelineMetrics>,
    prefs: PrefsStore,
    language_defaults: LanguageDefaults,
) {
    struct Speaker {
        sentence: SentenceAssemblerHandle,
        sentence_task: tokio::task::JoinHandle<()>,
        pipeline: tokio::task::JoinHandle<()>,
    }
    let mut speakers: HashMap<SpeakerId, Speaker> = HashMap::new();

    loop {
        tokio::select! {
            biased;

            _ = stop.wait() => {
                if let Err(err) = state.transition(SessionState::Stopping) {
                    tracing::warn!(error = %err, "unexpected state transition failure on stop");
                }
                break;
            }

            track = audio_tracks.recv() => {
                let Some(track) = track else {
                    tracing::debug!("audio track stream closed");
                    continue;
                };

                let (sentence, sentence_task) = captions_sentence::spawn(captions_sentence::SpawnArgs {
                    speaker: track.speaker.clone(),
                    config: assembler_config(&config),
                    publisher: publisher.clone(),
                    translation: dispatcher.clone(),
                    prefs: prefs.clone(),
                    language_defaults: language_defaults.clone(),
                    metrics: metrics.clone(),
                });

                let pipeline = pipeline::spawn(SpeakerPipelineArgs {
                    speaker: track.speaker.clone(),
                    sample_rate: track.sample_rate,
                    channels: track.channels,
                    frames: track.frames,
                    stt: stt.clone(),
                    prefs: prefs.clone(),
                    language_defaults: language_defaults.clone(),
                    aggregator_cfg: aggregator_config(&config),
                    filter_cfg: filter_config(&config),
                    sentence: sentence.clone(),
                    metrics: metrics.clone(),
                });

                speakers.insert(track.speaker, Speaker { sentence, sentence_task, pipeline });
            }

            message = data_messages.recv() => {
                let Some(payload) = message else {
                    tracing::debug!("data message stream closed");
                    continue;
                };
                if let Some(update) = crate::messages::parse_language_prefs(&payload) {
                    prefs.upsert(update.speaker, update.prefs);
                }
            }
        }
    }

    for (speaker, handle) in speakers.drain() {
        handle.pipeline.abort();
        handle.sentence.flush(true).await;
        drop(handle.sentence);
        let _ = handle.sentence_task.await;
        tracing::debug!(speaker = %speaker, "speaker pipeline torn down on stop");
    }

    if let Err(err) = room.disconnect().await {
        tracing::warn!(error = %err, "error disconnecting from room during shutdown");
    }

    if let Err(err) = state.transition(SessionState::Stopped) {
        tracing::warn!(error = %err, "unexpected state transition failure on teardown");
    }
}
