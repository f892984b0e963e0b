//! Runs one [`SentenceAssembler`] as an async task per speaker, racing
//! pause/finalize-grace deadlines against incoming appends in a single
//! `tokio::select!` loop so "pause wins over grace" is a plain match arm
//! rather than a lock-protected race between two timer callbacks.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant as TokioInstant;

use captions_foundation::{LanguageDefaults, PrefsStore, SpeakerId};
use captions_publish::{now_millis, CaptionRecord, OutboundPublisher};
use captions_telemetry::PipelineMetrics;
use captions_translate::TranslationDispatcher;

use crate::assembler::{AssemblerConfig, SentenceAssembler};

enum Command {
    Append(String),
    Flush { is_final: bool },
}

/// Cheap, `Clone`-able front for the actor's command channel. Held by the
/// speaker's audio pipeline (for appends) and by the orchestrator (for the
/// shutdown/unsubscribe flush).
#[derive(Clone)]
pub struct SentenceAssemblerHandle {
    tx: mpsc::Sender<Command>,
}

impl SentenceAssemblerHandle {
    pub async fn append(&self, slice: impl Into<String>) {
        let _ = self.tx.send(Command::Append(slice.into())).await;
    }

    pub async fn flush(&self, is_final: bool) {
        let _ = self.tx.send(Command::Flush { is_final }).await;
    }
}

pub struct SpawnArgs {
    pub speaker: SpeakerId,
    pub config: AssemblerConfig,
    pub publisher: Arc<OutboundPublisher>,
    pub translation: Arc<TranslationDispatcher>,
    pub prefs: PrefsStore,
    pub language_defaults: LanguageDefaults,
    pub metrics: Option<PipelineMetrics>,
}

/// Spawns the actor and returns a handle to it plus the task's own join
/// handle. The task runs until its last handle clone is dropped, at which
/// point it performs one final `flush(final=true)` (a no-op if the buffer
/// is already empty) before exiting; awaiting the join handle after
/// dropping every `SentenceAssemblerHandle` clone is the deterministic way
/// to know that final flush has been published.
pub fn spawn(args: SpawnArgs) -> (SentenceAssemblerHandle, tokio::task::JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(32);

    let join = tokio::spawn(async move {
        let mut assembler = SentenceAssembler::new(args.config.clone());
        let mut pause_deadline: Option<TokioInstant> = None;
        let mut finalize_deadline: Option<TokioInstant> = None;

        loop {
            let pause_sleep = async {
                match pause_deadline {
                    Some(d) => tokio::time::sleep_until(d).await,
                    None => std::future::pending().await,
                }
            };
            let finalize_sleep = async {
                match finalize_deadline {
                    Some(d) => tokio::time::sleep_until(d).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;

                cmd = rx.recv() => {
                    match cmd {
                        None => {
                            emit_and_dispatch(&mut assembler, true, &args).await;
                            break;
                        }
                        Some(Command::Append(slice)) => {
                            let outcome = assembler.append(&slice);
                            pause_deadline = Some(TokioInstant::now() + assembler.pause_final_duration());
                            finalize_deadline = outcome
                                .arm_finalize
                                .then(|| TokioInstant::now() + assembler.punct_grace_duration());
                        }
                        Some(Command::Flush { is_final }) => {
                            pause_deadline = None;
                            finalize_deadline = None;
                            emit_and_dispatch(&mut assembler, is_final, &args).await;
                        }
                    }
                }

                _ = finalize_sleep, if finalize_deadline.is_some() => {
                    finalize_deadline = None;
                    pause_deadline = None;
                    emit_and_dispatch(&mut assembler, true, &args).await;
                }

                _ = pause_sleep, if pause_deadline.is_some() => {
                    pause_deadline = None;
                    if finalize_deadline.take().is_some() {
                        // Pause wins over grace per spec §4.6 step 6.
                        emit_and_dispatch(&mut assembler, true, &args).await;
                    } else {
                        emit_and_dispatch(&mut assembler, false, &args).await;
                    }
                }
            }
        }
    });

    (SentenceAssemblerHandle { tx }, join)
}

async fn emit_and_dispatch(assembler: &mut SentenceAssembler, is_final: bool, args: &SpawnArgs) {
    let Some(emission) = assembler.flush(is_final) else {
        return;
    };

    if let Some(metrics) = &args.metrics {
        metrics.record_emission(emission.is_final);
    }

    let record = CaptionRecord::transcription(
        &args.speaker,
        &emission.text,
        emission.sentence_id,
        emission.is_final,
        now_millis(),
    );
    let published = args.publisher.publish(&record).await;
    if let Some(metrics) = &args.metrics {
        metrics.record_publish(!published);
    }

    if !emission.is_final {
        return;
    }

    let (stt_lang, target_lang) = args.prefs.resolve(&args.speaker, &args.language_defaults);
    let Some(target_lang) = target_lang else {
        return;
    };
    let recognition_lang = stt_lang.unwrap_or_else(|| "en".to_string());

    args.translation
        .dispatch(
            &args.speaker,
            &emission.text,
            emission.sentence_id,
            &recognition_lang,
            &target_lang,
        )
        .await;
}
