//! Chat-style LLM client used to translate a finalized sentence.

use async_trait::async_trait;
use captions_foundation::error::LlmError;
use serde::{Deserialize, Serialize};

const TRANSLATE_TEMPERATURE: f32 = 0.1;
const TRANSLATE_MAX_TOKENS: u32 = 100;

/// Adapter boundary between the translation dispatcher and whatever
/// chat-completion backend is configured.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Calls an OpenAI-compatible `/chat/completions` endpoint with a two-turn
/// request: a system instruction naming the target language, and the
/// sentence text as the user turn.
pub struct HttpTranslator {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpTranslator {
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
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, LlmError> {
        let system = format!(
            "Translate the following text to {target_language}. Return only the translation, no additional text."
        );

        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: TRANSLATE_MAX_TOKENS,
            temperature: TRANSLATE_TEMPERATURE,
        };

        let mut http_req = self.http.post(&self.endpoint).json(&req);
        if let Some(key) = &self.api_key {
            http_req = http_req.bearer_auth(key);
        }

        let resp = http_req.send().await.map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "llm endpoint returned non-success status");
            return Err(LlmError::EndpointError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| LlmError::Transport(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_low_temperature_and_small_budget() {
        let req = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "Translate the following text to es. Return only the translation, no additional text.",
                },
                ChatMessage {
                    role: "user",
                    content: "Hello world.",
                },
            ],
            max_tokens: TRANSLATE_MAX_TOKENS,
            temperature: TRANSLATE_TEMPERATURE,
        };
        assert_eq!(req.max_tokens, 100);
        assert!((req.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(req.messages[0].role, "system");
        assert!(req.messages[0].content.contains("es"));
    }

    #[test]
    fn empty_choices_is_an_error() {
        let resp = ChatResponse { choices: vec![] };
        assert!(resp.choices.into_iter().next().is_none());
    }
}
