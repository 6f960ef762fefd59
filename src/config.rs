// src/config.rs

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_ENDPOINT, DEFAULT_TYPEWRITER_INTERVAL_MS,
};
use crate::errors::{ColloquyError, ColloquyResult};
use crate::reassemble::RevealPolicy;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub endpoint: String,
    pub reveal_policy: RevealPolicy,
    pub typewriter_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reveal_policy: RevealPolicy::Immediate,
            typewriter_interval_ms: DEFAULT_TYPEWRITER_INTERVAL_MS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            log_level: "info".to_string(),
        }
    }
}

fn config_file_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("colloquy");
    path.push("config.json");
    path
}

/// Reads the config file, creating it with defaults on first run.
fn load_or_create(path: &Path) -> ColloquyResult<Config> {
    if path.exists() {
        let raw = fs::read_to_string(path)
            .map_err(|e| ColloquyError::config_error(format!("failed to read config: {}", e)))?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| ColloquyError::config_error(format!("failed to parse config: {}", e)))?;
        return Ok(config);
    }

    let config = Config::default();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ColloquyError::config_error(format!("failed to create config dir: {}", e))
        })?;
    }
    let raw = serde_json::to_string_pretty(&config)
        .map_err(|e| ColloquyError::config_error(format!("failed to serialize config: {}", e)))?;
    fs::write(path, raw)
        .map_err(|e| ColloquyError::config_error(format!("failed to write config: {}", e)))?;
    Ok(config)
}

fn apply_env_override(config: &mut Config) {
    if let Ok(endpoint) = std::env::var("COLLOQUY_ENDPOINT") {
        if !endpoint.is_empty() {
            config.endpoint = endpoint;
        }
    }
}

fn validate_config(config: &Config) -> ColloquyResult<()> {
    if config.endpoint.is_empty() {
        return Err(ColloquyError::config_error("endpoint must not be empty"));
    }
    if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
        return Err(ColloquyError::config_error(format!(
            "endpoint must be an http(s) url, got '{}'",
            config.endpoint
        )));
    }
    if config.typewriter_interval_ms == 0 || config.typewriter_interval_ms > 10_000 {
        return Err(ColloquyError::config_error(format!(
            "typewriter_interval_ms must be between 1 and 10000, got {}",
            config.typewriter_interval_ms
        )));
    }
    if config.connect_timeout_secs == 0 {
        return Err(ColloquyError::config_error(
            "connect_timeout_secs must be at least 1",
        ));
    }
    match config.log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        other => Err(ColloquyError::config_error(format!(
            "unknown log_level '{}'",
            other
        ))),
    }
}

/// Loads, validates, and installs the global config. Call once at startup,
/// before anything reads `CONFIG`.
pub fn initialize_config() -> ColloquyResult<()> {
    let mut config = load_or_create(&config_file_path())?;
    apply_env_override(&mut config);
    validate_config(&config)?;
    if let Ok(mut guard) = CONFIG.write() {
        *guard = config;
    }
    Ok(())
}

pub fn get_config() -> Config {
    CONFIG
        .read()
        .map(|config| config.clone())
        .unwrap_or_else(|_| Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_run_writes_a_default_config_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("colloquy").join("config.json");

        let config = load_or_create(&path).expect("create default");
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // A second load reads the file it just wrote.
        let reread = load_or_create(&path).expect("reread");
        assert_eq!(reread, config);
    }

    #[test]
    fn existing_file_wins_over_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "endpoint": "http://10.0.0.7:8000/predict/",
                "reveal_policy": "word-buffered",
                "typewriter_interval_ms": 25,
                "connect_timeout_secs": 3,
                "log_level": "debug"
            }"#,
        )
        .expect("write");

        let config = load_or_create(&path).expect("load");
        assert_eq!(config.endpoint, "http://10.0.0.7:8000/predict/");
        assert_eq!(config.reveal_policy, RevealPolicy::WordBuffered);
        assert_eq!(config.typewriter_interval_ms, 25);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");

        let err = load_or_create(&path).expect_err("parse failure");
        assert!(err.to_string().contains("parse"), "{}", err);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let ok = Config::default();
        assert!(validate_config(&ok).is_ok());

        let mut bad = Config::default();
        bad.endpoint = String::new();
        assert!(validate_config(&bad).is_err());

        let mut bad = Config::default();
        bad.endpoint = "ftp://wrong".to_string();
        assert!(validate_config(&bad).is_err());

        let mut bad = Config::default();
        bad.typewriter_interval_ms = 0;
        assert!(validate_config(&bad).is_err());

        let mut bad = Config::default();
        bad.log_level = "loud".to_string();
        assert!(validate_config(&bad).is_err());
    }

    #[test]
    fn env_var_overrides_the_endpoint() {
        std::env::set_var("COLLOQUY_ENDPOINT", "http://override:9000/predict/");
        let mut config = Config::default();
        apply_env_override(&mut config);
        std::env::remove_var("COLLOQUY_ENDPOINT");

        assert_eq!(config.endpoint, "http://override:9000/predict/");
    }
}
