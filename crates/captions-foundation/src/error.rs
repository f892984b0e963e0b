use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptionsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Stt(#[from] SttError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("room already running: {room}")]
    AlreadyRunning { room: String },

    #[error("room not running: {room}")]
    NotRunning { room: String },

    #[error("shutdown requested")]
    ShutdownRequested,

    #[error("fatal error, cannot recover: {0}")]
    Fatal(String),

    #[error("transient error, will retry: {0}")]
    Transient(String),
}

impl From<tokio::task::JoinError> for CaptionsError {
    fn from(err: tokio::task::JoinError) -> Self {
        CaptionsError::Transient(format!("task join failed: {err}"))
    }
}

/// STT client adapter failures.
#[derive(Debug, thiserror::Error)]
pub enum SttError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("stt endpoint returned {status}: {body}")]
    EndpointError { status: u16, body: String },

    #[error("response missing `text` field")]
    MalformedResponse,
}

/// Translation dispatcher failures.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("llm endpoint returned {status}: {body}")]
    EndpointError { status: u16, body: String },

    #[error("response had no choices")]
    EmptyResponse,
}

/// Conferencing room / publisher failures.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("failed to connect to room {room}: {reason}")]
    ConnectFailed { room: String, reason: String },

    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("no such participant: {0}")]
    UnknownParticipant(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration parsing error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Clone)]
pub enum RecoveryStrategy {
    Retry { max_attempts: u32, delay: Duration },
    Ignore,
    Fatal,
}

impl CaptionsError {
    /// Transport/service failures log-and-drop, bad control-surface input
    /// is a 4xx, and only explicit fatal/shutdown paths are non-recoverable.
    /// No automatic retries are introduced; `Retry` here exists for room
    /// (re)connect only, not STT/LLM calls.
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            CaptionsError::Stt(_) | CaptionsError::Llm(_) => RecoveryStrategy::Ignore,
            CaptionsError::Room(RoomError::ConnectFailed { .. }) => RecoveryStrategy::Retry {
                max_attempts: 1,
                delay: Duration::from_secs(0),
            },
            CaptionsError::Fatal(_) | CaptionsError::ShutdownRequested => {
                RecoveryStrategy::Fatal
            }
            _ => RecoveryStrategy::Ignore,
        }
    }
}
