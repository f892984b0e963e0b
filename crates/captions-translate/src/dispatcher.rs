//! C7: on finalization, translates a sentence and publishes a translation
//! record tied to the same sentence id.

use std::sync::Arc;

use captions_foundation::SpeakerId;
use captions_publish::{now_millis, CaptionRecord, OutboundPublisher};
use captions_telemetry::PipelineMetrics;

use crate::client::Translator;

/// Resolves target-vs-recognition language and, unless they match,
/// dispatches a translation request and publishes the result.
///
/// Per REDESIGN FLAG R1, "skip translation" is `recognition_lang ==
/// target_lang` (case-insensitive), not a hardcoded `"en"` sentinel: a
/// non-English recognition language that happens to match the requested
/// target language is still skipped.
pub struct TranslationDispatcher {
    translator: Arc<dyn Translator>,
    publisher: Arc<OutboundPublisher>,
    metrics: Option<PipelineMetrics>,
}

impl TranslationDispatcher {
    pub fn new(translator: Arc<dyn Translator>, publisher: Arc<OutboundPublisher>) -> Self {
        Self {
            translator,
            publisher,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn dispatch(
        &self,
        speaker: &SpeakerId,
        text: &str,
        sentence_id: u64,
        recognition_lang: &str,
        target_lang: &str,
    ) {
        if recognition_lang.eq_ignore_ascii_case(target_lang) {
            tracing::trace!(
                speaker = %speaker,
                sentence_id,
                lang = recognition_lang,
                "translation skipped: recognition language matches target"
            );
            return;
        }

        match self.translator.translate(text, target_lang).await {
            Ok(translated) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_translation(false);
                }
                let record = CaptionRecord::translation(
                    speaker,
                    text,
                    translated,
                    target_lang,
                    sentence_id,
                    now_millis(),
                );
                let published = self.publisher.publish(&record).await;
                if let Some(metrics) = &self.metrics {
                    metrics.record_publish(!published);
                }
            }
            Err(err) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_translation(true);
                }
                tracing::warn!(speaker = %speaker, sentence_id, error = %err, "translation failed, dropping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use captions_foundation::error::LlmError;
    use captions_publish::DataPublisher;
    use parking_lot::Mutex;

    struct EchoTranslator;

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(&self, text: &str, target_language: &str) -> Result<String, LlmError> {
            Ok(format!("[{target_language}] {text}"))
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(&self, _text: &str, _target_language: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyResponse)
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<CaptionRecord>>,
    }

    #[async_trait]
    impl DataPublisher for RecordingPublisher {
        async fn publish_data(
            &self,
            _topic: &str,
            payload: Vec<u8>,
            _reliable: bool,
        ) -> Result<(), captions_foundation::error::RoomError> {
            let record: CaptionRecord = serde_json::from_slice(&payload).unwrap();
            self.published.lock().push(record);
            Ok(())
        }

        async fn send_chat(&self, _line: &str) -> Result<(), captions_foundation::error::RoomError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn same_recognition_and_target_language_skips_translation() {
        let recorder = Arc::new(RecordingPublisher::default());
        let publisher = Arc::new(OutboundPublisher::new(recorder.clone(), false));
        let dispatcher = TranslationDispatcher::new(Arc::new(EchoTranslator), publisher);

        let speaker = SpeakerId::new("p1");
        dispatcher.dispatch(&speaker, "hola", 1, "es", "ES").await;

        assert!(recorder.published.lock().is_empty());
    }

    #[tokio::test]
    async fn different_languages_dispatch_and_publish_translation() {
        let recorder = Arc::new(RecordingPublisher::default());
        let publisher = Arc::new(OutboundPublisher::new(recorder.clone(), false));
        let dispatcher = TranslationDispatcher::new(Arc::new(EchoTranslator), publisher);

        let speaker = SpeakerId::new("p1");
        dispatcher
            .dispatch(&speaker, "Hello world.", 1, "en", "es")
            .await;

        let published = recorder.published.lock();
        assert_eq!(published.len(), 1);
        match &published[0] {
            CaptionRecord::Translation {
                original_text,
                translated_text,
                target_language,
                sentence_id,
                ..
            } => {
                assert_eq!(original_text, "Hello world.");
                assert_eq!(translated_text, "[es] Hello world.");
                assert_eq!(target_language, "es");
                assert_eq!(*sentence_id, 1);
            }
            other => panic!("expected translation record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_english_recognition_with_distinct_target_still_translates() {
        // Guards against the R1 regression: a literal "en" sentinel would
        // wrongly translate fr->fr here since recognition isn't "en".
        let recorder = Arc::new(RecordingPublisher::default());
        let publisher = Arc::new(OutboundPublisher::new(recorder.clone(), false));
        let dispatcher = TranslationDispatcher::new(Arc::new(EchoTranslator), publisher);

        let speaker = SpeakerId::new("p1");
        dispatcher.dispatch(&speaker, "bonjour", 1, "fr", "fr").await;

        assert!(
            recorder.published.lock().is_empty(),
            "same-language translation must be skipped even when recognition isn't English"
        );
    }

    #[tokio::test]
    async fn translator_failure_is_dropped_without_publishing() {
        let recorder = Arc::new(RecordingPublisher::default());
        let publisher = Arc::new(OutboundPublisher::new(recorder.clone(), false));
        let dispatcher = TranslationDispatcher::new(Arc::new(FailingTranslator), publisher);

        let speaker = SpeakerId::new("p1");
        dispatcher.dispatch(&speaker, "Hello.", 1, "en", "es").await;

        assert!(recorder.published.lock().is_empty());
    }
}
