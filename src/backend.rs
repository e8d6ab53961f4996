use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::services::{ServeDir, ServeFile};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STATIC_DIR: &str = "dist";
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;
const SERVICE_NAME: &str = "aurora-portfolio";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum LogLevel {
    Debug,
    Info,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ServerConfig {
    port: u16,
    static_dir: PathBuf,
    log_level: LogLevel,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            port: parse_port(std::env::var("PORT").ok()),
            static_dir: parse_static_dir(std::env::var("STATIC_DIR").ok()),
            log_level: parse_log_level(std::env::var("LOG_LEVEL").ok()),
        }
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    raw.and_then(|value| value.parse::<u16>().ok())
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_PORT)
}

fn parse_static_dir(raw: Option<String>) -> PathBuf {
    match raw {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_STATIC_DIR),
    }
}

fn parse_log_level(raw: Option<String>) -> LogLevel {
    match raw.as_deref() {
        Some("debug") => LogLevel::Debug,
        Some("info") => LogLevel::Info,
        _ => DEFAULT_LOG_LEVEL,
    }
}

#[derive(Clone)]
struct AppState {
    config: ServerConfig,
    started_at: Instant,
}

#[derive(Serialize)]
struct HealthPayload {
    ok: bool,
    service: &'static str,
    uptime_seconds: u64,
}

impl HealthPayload {
    fn at_uptime(uptime: Duration) -> Self {
        Self {
            ok: true,
            service: SERVICE_NAME,
            uptime_seconds: uptime.as_secs(),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();
    let bind_address = format!("0.0.0.0:{}", config.port);

    let index = config.static_dir.join("index.html");
    let static_service = ServeDir::new(&config.static_dir).not_found_service(ServeFile::new(index));

    let state = AppState {
        config: config.clone(),
        started_at: Instant::now(),
    };

    let app = Router::new()
        .route("/healthz", get(get_health))
        .fallback_service(static_service)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log_event(
        &config,
        LogLevel::Info,
        "server_start",
        serde_json::json!({
            "port": config.port,
            "static_dir": config.static_dir.display().to_string(),
        }),
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn get_health(State(state): State<AppState>) -> Json<HealthPayload> {
    let uptime = state.started_at.elapsed();
    log_event(
        &state.config,
        LogLevel::Debug,
        "health_request",
        serde_json::json!({ "uptime_seconds": uptime.as_secs() }),
    );
    Json(HealthPayload::at_uptime(uptime))
}

fn log_event(config: &ServerConfig, level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < config.log_level {
        return;
    }

    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(now_unix_seconds())),
    );
    payload.insert(
        "level".to_string(),
        serde_json::Value::String(level.as_str().to_string()),
    );
    payload.insert(
        "event".to_string(),
        serde_json::Value::String(event.to_string()),
    );

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    println!("{}", serde_json::Value::Object(payload));
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_missing_or_invalid() {
        assert_eq!(parse_port(None), DEFAULT_PORT);
        assert_eq!(parse_port(Some("not-a-port".to_string())), DEFAULT_PORT);
        assert_eq!(parse_port(Some("0".to_string())), DEFAULT_PORT);
        assert_eq!(parse_port(Some("70000".to_string())), DEFAULT_PORT);
    }

    #[test]
    fn port_accepts_valid_values() {
        assert_eq!(parse_port(Some("3000".to_string())), 3000);
    }

    #[test]
    fn static_dir_defaults_when_blank() {
        assert_eq!(parse_static_dir(None), PathBuf::from(DEFAULT_STATIC_DIR));
        assert_eq!(
            parse_static_dir(Some("  ".to_string())),
            PathBuf::from(DEFAULT_STATIC_DIR)
        );
        assert_eq!(
            parse_static_dir(Some("public".to_string())),
            PathBuf::from("public")
        );
    }

    #[test]
    fn log_level_parsing_falls_back_to_info() {
        assert_eq!(parse_log_level(Some("debug".to_string())), LogLevel::Debug);
        assert_eq!(parse_log_level(Some("info".to_string())), LogLevel::Info);
        assert_eq!(parse_log_level(Some("verbose".to_string())), LogLevel::Info);
        assert_eq!(parse_log_level(None), LogLevel::Info);
    }

    #[test]
    fn debug_ranks_below_info() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert_eq!(LogLevel::Info.as_str(), "info");
        assert_eq!(LogLevel::Debug.as_str(), "debug");
    }

    #[test]
    fn health_payload_serializes_expected_fields() {
        let payload = HealthPayload::at_uptime(Duration::from_secs(90));
        let value = serde_json::to_value(&payload).expect("payload serializes");

        assert_eq!(value["ok"], true);
        assert_eq!(value["service"], SERVICE_NAME);
        assert_eq!(value["uptime_seconds"], 90);
    }
}
