//! Fire-and-forget publication of caption records onto the conference's
//! reliable data channel, with an optional plain-chat mirror.

use std::sync::Arc;

use async_trait::async_trait;
use captions_foundation::error::RoomError;

use crate::wire::CaptionRecord;

pub const CAPTIONS_TOPIC: &str = "captions";

/// The publish side of the conferencing SDK's data channel. Implemented by
/// the room client crate; a production implementation talks to the live
/// SDK, a test implementation records what was sent.
#[async_trait]
pub trait DataPublisher: Send + Sync {
    async fn publish_data(&self, topic: &str, payload: Vec<u8>, reliable: bool) -> Result<(), RoomError>;
    async fn send_chat(&self, line: &str) -> Result<(), RoomError>;
}

/// Serializes [`CaptionRecord`]s to JSON and publishes them on the
/// `captions` topic. All publications are fire-and-forget: failures are
/// logged via the metrics sink, never propagated to the pipeline that
/// produced the record.
pub struct OutboundPublisher {
    publisher: Arc<dyn DataPublisher>,
    send_chat: bool,
}

impl OutboundPublisher {
    pub fn new(publisher: Arc<dyn DataPublisher>, send_chat: bool) -> Self {
        Self {
            publisher,
            send_chat,
        }
    }

    /// Publishes one record. Returns whether the data-channel publish
    /// succeeded (the caller may feed this to a metrics counter); the
    /// chat mirror, if enabled, is always best-effort and never changes
    /// the return value.
    pub async fn publish(&self, record: &CaptionRecord) -> bool {
        let payload = match serde_json::to_vec(record) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize caption record, dropping");
                return false;
            }
        };

        let ok = match self.publisher.publish_data(CAPTIONS_TOPIC, payload, true).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "caption publish failed");
                false
            }
        };

        if self.send_chat {
            if let Err(err) = self.publisher.send_chat(&record.as_chat_line()).await {
                tracing::warn!(error = %err, "chat mirror publish failed");
            }
        }

        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use captions_foundation::SpeakerId;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        data: Mutex<Vec<(String, Vec<u8>)>>,
        chat: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DataPublisher for RecordingPublisher {
        async fn publish_data(&self, topic: &str, payload: Vec<u8>, _reliable: bool) -> Result<(), RoomError> {
            self.data.lock().push((topic.to_string(), payload));
            Ok(())
        }

        async fn send_chat(&self, line: &str) -> Result<(), RoomError> {
            self.chat.lock().push(line.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_without_chat_mirror_only_emits_data_message() {
        let recorder = Arc::new(RecordingPublisher::default());
        let publisher = OutboundPublisher::new(recorder.clone(), false);
        let speaker = SpeakerId::new("p1");
        let record = CaptionRecord::transcription(&speaker, "hi", 1, true, 0);

        assert!(publisher.publish(&record).await);
        assert_eq!(recorder.data.lock().len(), 1);
        assert_eq!(recorder.data.lock()[0].0, CAPTIONS_TOPIC);
        assert!(recorder.chat.lock().is_empty());
    }

    #[tokio::test]
    async fn publish_with_chat_mirror_emits_both() {
        let recorder = Arc::new(RecordingPublisher::default());
        let publisher = OutboundPublisher::new(recorder.clone(), true);
        let speaker = SpeakerId::new("p1");
        let record = CaptionRecord::transcription(&speaker, "hi", 1, true, 0);

        assert!(publisher.publish(&record).await);
        assert_eq!(recorder.data.lock().len(), 1);
        assert_eq!(recorder.chat.lock().len(), 1);
        assert_eq!(recorder.chat.lock()[0], "[Transcript] p1: hi");
    }

    struct FailingPublisher;

    #[async_trait]
    impl DataPublisher for FailingPublisher {
        async fn publish_data(&self, _topic: &str, _payload: Vec<u8>, _reliable: bool) -> Result<(), RoomError> {
            Err(RoomError::PublishFailed("closed".to_string()))
        }

        async fn send_chat(&self, _line: &str) -> Result<(), RoomError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_failure_does_not_panic_and_reports_false() {
        let publisher = OutboundPublisher::new(Arc::new(FailingPublisher), false);
        let speaker = SpeakerId::new("p1");
        let record = CaptionRecord::transcription(&speaker, "hi", 1, true, 0);
        assert!(!publisher.publish(&record).await);
    }
}
