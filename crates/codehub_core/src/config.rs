//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_ADMIN_USERNAME, DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SERVER_URL,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration shared by the CLI and the endpoint server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Remote endpoint every action is sent to.
    pub endpoint: String,
    /// Location of the persisted local state document.
    pub state_path: String,
    /// Name that resolves to the admin role at session start.
    pub admin_username: String,
    pub port: u16,
    pub max_upload_size: usize,
    pub request_timeout_secs: u64,
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Default location of the local state document.
///
/// # Returns
/// `~/.cache/codehub/state.json`, relative to the current directory when no
/// home directory can be resolved.
pub fn default_state_path() -> PathBuf {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache").join("codehub").join("state.json")
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SERVER_URL.to_string(),
            state_path: default_state_path().to_string_lossy().to_string(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            port: DEFAULT_PORT,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or fail to parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: env_nonempty("CODEHUB_ENDPOINT").unwrap_or(defaults.endpoint),
            state_path: env_nonempty("CODEHUB_STATE_PATH")
                .map(expand_tilde)
                .unwrap_or(defaults.state_path),
            admin_username: env_nonempty("CODEHUB_ADMIN").unwrap_or(defaults.admin_username),
            port: env_parsed("CODEHUB_PORT").unwrap_or(defaults.port),
            max_upload_size: env_parsed("CODEHUB_MAX_UPLOAD_SIZE")
                .unwrap_or(defaults.max_upload_size),
            request_timeout_secs: env_parsed("CODEHUB_REQUEST_TIMEOUT")
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{expand_tilde, parse_env_flag, Config};
    use crate::constants::{DEFAULT_ADMIN_USERNAME, DEFAULT_PORT, DEFAULT_SERVER_URL};
    use crate::env::{env_lock, EnvGuard};

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
        assert_eq!(parse_env_flag("enabled"), None);
    }

    #[test]
    fn from_env_applies_defaults_for_missing_and_invalid_values() {
        let _lock = env_lock().lock().expect("env lock");
        let _endpoint = EnvGuard::remove("CODEHUB_ENDPOINT");
        let _admin = EnvGuard::set("CODEHUB_ADMIN", "   ");
        let _port = EnvGuard::set("CODEHUB_PORT", "not-a-port");
        let _timeout = EnvGuard::remove("CODEHUB_REQUEST_TIMEOUT");

        let config = Config::from_env();
        assert_eq!(config.endpoint, DEFAULT_SERVER_URL);
        assert_eq!(config.admin_username, DEFAULT_ADMIN_USERNAME);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn from_env_reads_overrides() {
        let _lock = env_lock().lock().expect("env lock");
        let _endpoint = EnvGuard::set("CODEHUB_ENDPOINT", " https://example.test/exec ");
        let _admin = EnvGuard::set("CODEHUB_ADMIN", "khush");
        let _port = EnvGuard::set("CODEHUB_PORT", "4100");
        let _state = EnvGuard::set("CODEHUB_STATE_PATH", "/tmp/codehub-state.json");

        let config = Config::from_env();
        assert_eq!(config.endpoint, "https://example.test/exec");
        assert_eq!(config.admin_username, "khush");
        assert_eq!(config.port, 4100);
        assert_eq!(config.state_path, "/tmp/codehub-state.json");
    }

    #[test]
    fn expand_tilde_uses_home() {
        let _lock = env_lock().lock().expect("env lock");
        let _home = EnvGuard::set("HOME", "/home/tester");
        assert_eq!(
            expand_tilde("~/state.json".to_string()),
            "/home/tester/state.json"
        );
        assert_eq!(expand_tilde("/abs/state.json".to_string()), "/abs/state.json");
    }
}
