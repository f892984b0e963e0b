//! The control surface: `GET /health`, `POST /start`, `POST /stop`,
//! `GET /sessions`, exactly as spec.md §6 names them. Mirrors the
//! teacher's `axum::State<Arc<T>>` + `Json<T>` request/response shape.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use captions_foundation::{LanguageDefaults, PrefsStore};
use captions_room::AgentIdentity;
use captions_session::ConnectArgs;
use captions_telemetry::PipelineMetrics;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/sessions", get(sessions))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: captions_publish::now_millis(),
    })
}

#[derive(Deserialize)]
struct StartRequest {
    #[serde(rename = "roomName")]
    room_name: Option<String>,
    #[serde(rename = "targetLanguage")]
    target_language: Option<String>,
    #[serde(rename = "sttLanguage")]
    stt_language: Option<String>,
}

#[derive(Serialize)]
struct StartResponse {
    status: &'static str,
    #[serde(rename = "roomName")]
    room_name: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    details: String,
}

async fn start(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(room_name) = body.room_name.filter(|s| !s.is_empty()) else {
        return bad_request("missing required field `roomName`");
    };

    let (room, publisher_target) = state.room_factory.build(&room_name);
    let metrics = PipelineMetrics::new();

    let args = ConnectArgs {
        room_name: room_name.clone(),
        identity: AgentIdentity::default(),
        room,
        publisher_target,
        stt: state.stt.clone(),
        translator: state.translator.clone(),
        config: state.config.clone(),
        metrics: Some(metrics),
        prefs: PrefsStore::new(),
        language_defaults: LanguageDefaults {
            stt_language: body.stt_language.or_else(|| state.config.stt_language.clone()),
            target_language: body.target_language,
        },
    };

    match state.manager.start(args).await {
        Ok(_outcome) => (
            StatusCode::OK,
            Json(serde_json::to_value(StartResponse { status: "ok", room_name }).unwrap()),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(
                serde_json::to_value(ErrorResponse {
                    error: "failed to start room session",
                    details: err.to_string(),
                })
                .unwrap(),
            ),
        ),
    }
}

#[derive(Deserialize)]
struct StopRequest {
    #[serde(rename = "roomName")]
    room_name: Option<String>,
}

#[derive(Serialize)]
struct StopResponse {
    status: &'static str,
}

async fn stop(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StopRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(room_name) = body.room_name.filter(|s| !s.is_empty()) else {
        return bad_request("missing required field `roomName`");
    };

    state.manager.stop(&room_name).await;
    (
        StatusCode::OK,
        Json(serde_json::to_value(StopResponse { status: "ok" }).unwrap()),
    )
}

#[derive(Serialize)]
struct SessionsResponse {
    #[serde(rename = "activeRooms")]
    active_rooms: Vec<String>,
}

async fn sessions(State(state): State<Arc<AppState>>) -> Json<SessionsResponse> {
    Json(SessionsResponse {
        active_rooms: state.manager.active_rooms().await,
    })
}

fn bad_request(details: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(
            serde_json::to_value(ErrorResponse {
                error: "invalid request",
                details: details.to_string(),
            })
            .unwrap(),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use captions_foundation::{error::LlmError, error::SttError, AgentConfig};
    use captions_room::{MemoryRoomClient, RoomClient};
    use captions_stt::SttClient;
    use captions_translate::Translator;
    use std::sync::Mutex;

    struct StubStt;
    #[async_trait]
    impl SttClient for StubStt {
        async fn transcribe(
            &self,
            _window: &captions_audio::AudioWindow,
            _language: Option<&str>,
        ) -> Result<String, SttError> {
            Ok(String::new())
        }
    }

    struct StubTranslator;
    #[async_trait]
    impl Translator for StubTranslator {
        async fn translate(&self, text: &str, _target_language: &str) -> Result<String, LlmError> {
            Ok(text.to_string())
        }
    }

    struct MemoryRoomFactory {
        rooms: Mutex<Vec<Arc<MemoryRoomClient>>>,
    }

    impl MemoryRoomFactory {
        fn new() -> Self {
            Self { rooms: Mutex::new(Vec::new()) }
        }
    }

    impl crate::state::RoomFactory for MemoryRoomFactory {
        fn build(
            &self,
            _room_name: &str,
        ) -> (Arc<dyn RoomClient>, Arc<dyn captions_publish::DataPublisher>) {
            let (room, _handles) = MemoryRoomClient::new();
            let room = Arc::new(room);
            self.rooms.lock().unwrap().push(room.clone());
            (room.clone(), room)
        }
    }

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::new(StubStt),
            Arc::new(StubTranslator),
            AgentConfig::default(),
            Arc::new(MemoryRoomFactory::new()),
        ))
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn start_without_room_name_is_bad_request() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/start")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn start_then_sessions_lists_the_room() {
        let state = test_state();
        let app = router(state.clone());
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/start")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"roomName":"room-1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: SessionsResponseTest = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.active_rooms, vec!["room-1".to_string()]);
    }

    #[derive(Deserialize)]
    struct SessionsResponseTest {
        #[serde(rename = "activeRooms")]
        active_rooms: Vec<String>,
    }

    #[tokio::test]
    async fn starting_twice_is_ok_not_an_error() {
        let state = test_state();
        let app = router(state.clone());
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/start")
                        .header("content-type", "application/json")
                        .body(Body::from(r#"{"roomName":"room-1"}"#))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn stop_without_room_name_is_bad_request() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/stop")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stopping_unknown_room_is_still_ok() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/stop")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"roomName":"never-started"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
