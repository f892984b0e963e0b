// Logging behavior:
// - Writes logs to both stderr and a daily-rotated file at logs/captions-agent.log.
// - Default log level is INFO. Control via RUST_LOG, e.g. RUST_LOG=captions_session=debug.
// - The logs/ directory is created on startup if missing; file output uses a non-blocking writer.
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use captions_agent::state::{AppState, UnconfiguredRoomFactory};
use captions_foundation::ShutdownHandler;
use captions_stt::HttpSttClient;
use captions_translate::HttpTranslator;

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "captions-agent.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let file_layer = fmt::layer().with_writer(non_blocking_file).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(guard)
}

/// Prune rotated log files in `logs/` older than `retention_days` days.
/// `Some(0)` disables pruning. Default is 7 days when `None`.
fn prune_old_logs(retention_days: Option<u64>) {
    let retention = retention_days.unwrap_or(7);
    if retention == 0 {
        tracing::debug!("log retention disabled (retention_days=0)");
        return;
    }

    let cutoff = match std::time::SystemTime::now()
        .checked_sub(std::time::Duration::from_secs(retention * 24 * 60 * 60))
    {
        Some(t) => t,
        None => return,
    };

    let logs_dir = std::path::Path::new("logs");
    if !logs_dir.exists() {
        return;
    }

    let entries = match std::fs::read_dir(logs_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read logs directory for pruning");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !name.starts_with("captions-agent.log.") {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        let Ok(modified) = meta.modified() else { continue };
        if modified < cutoff {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove old log");
            } else {
                tracing::info!(path = %path.display(), "removed old log file");
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "captions-agent", author, version, about = "conference captioning agent control surface")]
struct Cli {
    /// HTTP port for the control surface
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Days of rotated logs to retain; 0 disables pruning
    #[arg(long = "log-retention-days", env = "LOG_RETENTION_DAYS")]
    log_retention_days: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = init_logging()?;
    let cli = Cli::parse();
    prune_old_logs(cli.log_retention_days);
    tracing::info!("starting captions-agent");

    let config = captions_foundation::AgentConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to load configuration, falling back to defaults");
        captions_foundation::AgentConfig::default()
    });

    let http_client = reqwest::Client::new();

    let stt_endpoint = std::env::var("STT_ENDPOINT")
        .unwrap_or_else(|_| "https://api.openai.com/v1/audio/transcriptions".to_string());
    let mut stt_client = HttpSttClient::new(http_client.clone(), stt_endpoint, config.openai_stt_model.clone());
    if let Ok(key) = std::env::var("STT_API_KEY") {
        stt_client = stt_client.with_api_key(key);
    }

    let llm_endpoint =
        std::env::var("LLM_ENDPOINT").unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
    let llm_model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    let mut llm_client = HttpTranslator::new(http_client, llm_endpoint, llm_model);
    if let Ok(key) = std::env::var("LLM_API_KEY") {
        llm_client = llm_client.with_api_key(key);
    }

    let state = Arc::new(AppState::new(
        Arc::new(stt_client),
        Arc::new(llm_client),
        config,
        Arc::new(UnconfiguredRoomFactory),
    ));

    let shutdown = ShutdownHandler::new().install().await;

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "control surface listening");

    let app = captions_agent::http::router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

    for room_name in state.manager.active_rooms().await {
        state.manager.stop(&room_name).await;
    }

    tracing::info!("captions-agent stopped");
    Ok(())
}
