//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (path overridable via `FRONTDESK_CONFIG`), then applies
//! `FRONTDESK_WS_URL` and `FRONTDESK_LOG_LEVEL` env overrides.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// Socket transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// WebSocket endpoint the client connects to.
    pub ws_url: String,
    /// Maximum reconnect attempts after an abnormal close.
    pub reconnect_attempts: u32,
    /// Fixed delay between reconnect attempts, in seconds.
    pub reconnect_delay_seconds: u64,
}

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for reservation/room endpoints (no trailing slash).
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Fully-resolved client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub hotel_name: String,
    pub log_level: String,
    pub transport: TransportConfig,
    pub api: ApiConfig,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    client: RawClient,
    #[serde(default)]
    transport: RawTransport,
    #[serde(default)]
    api: RawApi,
}

#[derive(Deserialize)]
struct RawClient {
    hotel_name: String,
    log_level: String,
}

#[derive(Deserialize)]
struct RawTransport {
    #[serde(default = "default_ws_url")]
    ws_url: String,
    #[serde(default = "default_reconnect_attempts")]
    reconnect_attempts: u32,
    #[serde(default = "default_reconnect_delay_seconds")]
    reconnect_delay_seconds: u64,
}

impl Default for RawTransport {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_delay_seconds: default_reconnect_delay_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawApi {
    #[serde(default = "default_api_base_url")]
    base_url: String,
    #[serde(default = "default_api_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawApi {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_seconds: default_api_timeout_seconds(),
        }
    }
}

fn default_ws_url() -> String { "ws://127.0.0.1:8080/ws".to_string() }
fn default_reconnect_attempts() -> u32 { 5 }
fn default_reconnect_delay_seconds() -> u64 { 5 }
fn default_api_base_url() -> String { "http://127.0.0.1:8080/api".to_string() }
fn default_api_timeout_seconds() -> u64 { 30 }

/// Load config from `config/default.toml` (or `FRONTDESK_CONFIG`), then
/// apply env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let path = env::var("FRONTDESK_CONFIG")
        .map(|p| expand_home(&p))
        .unwrap_or_else(|_| PathBuf::from("config/default.toml"));
    let ws_url_override = env::var("FRONTDESK_WS_URL").ok();
    let log_level_override = env::var("FRONTDESK_LOG_LEVEL").ok();
    load_from(&path, ws_url_override.as_deref(), log_level_override.as_deref())
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    ws_url_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let log_level = log_level_override
        .unwrap_or(&parsed.client.log_level)
        .to_string();
    let ws_url = ws_url_override
        .unwrap_or(&parsed.transport.ws_url)
        .to_string();

    Ok(Config {
        hotel_name: parsed.client.hotel_name,
        log_level,
        transport: TransportConfig {
            ws_url,
            reconnect_attempts: parsed.transport.reconnect_attempts,
            reconnect_delay_seconds: parsed.transport.reconnect_delay_seconds,
        },
        api: ApiConfig {
            base_url: parsed.api.base_url.trim_end_matches('/').to_string(),
            timeout_seconds: parsed.api.timeout_seconds,
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — local endpoints, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            hotel_name: "test-hotel".into(),
            log_level: "info".into(),
            transport: TransportConfig {
                ws_url: "ws://localhost:0/ws".into(),
                reconnect_attempts: 2,
                reconnect_delay_seconds: 0,
            },
            api: ApiConfig {
                base_url: "http://localhost:0/api".into(),
                timeout_seconds: 1,
            },
        }
    }
}
