//! HTTP-based speech-to-text client adapter.
//!
//! Submits an already-windowed, already-encoded WAV buffer to a remote STT
//! endpoint and returns the trimmed transcript text. No retries: transport
//! and endpoint failures are returned to the caller, which logs and drops
//! the window per the filter/assembler pipeline's error policy.

use async_trait::async_trait;
use captions_audio::{encode_wav, AudioWindow};
use captions_foundation::error::SttError;
use serde::Deserialize;

/// Adapter boundary between the recognition-window pipeline and whatever
/// remote (or, in tests, in-memory) speech-to-text backend is configured.
#[async_trait]
pub trait SttClient: Send + Sync {
    async fn transcribe(&self, window: &AudioWindow, language: Option<&str>) -> Result<String, SttError>;
}

#[derive(Debug, Deserialize)]
struct SttResponse {
    text: Option<String>,
}

/// Calls an OpenAI-compatible `/audio/transcriptions` endpoint with a
/// multipart upload: field `file` (the WAV blob), `model`, and an optional
/// `language` hint.
pub struct HttpSttClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpSttClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl SttClient for HttpSttClient {
    async fn transcribe(&self, window: &AudioWindow, language: Option<&str>) -> Result<String, SttError> {
        let wav = encode_wav(&window.samples, window.sample_rate, window.channels);

        let file_part = reqwest::multipart::Part::bytes(wav)
            .file_name("window.wav")
            .mime_str("audio/wav")
            .map_err(|e| SttError::Transport(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        let mut req = self.http.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| SttError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "stt endpoint returned non-success status");
            return Err(SttError::EndpointError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SttResponse = resp.json().await.map_err(|e| SttError::Transport(e.to_string()))?;
        parsed
            .text
            .map(|t| t.trim().to_string())
            .ok_or(SttError::MalformedResponse)
    }
}
