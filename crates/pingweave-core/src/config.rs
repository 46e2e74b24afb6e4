//! Configuration system for pingweave.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $PINGWEAVE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/pingweave/config.toml
//!   3. ~/.config/pingweave/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Fallback for both refresh intervals when nothing else is configured.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PingweaveConfig {
    pub controller: ControllerConfig,
    pub param: ParamConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Control-plane address. The server binds here; agents connect here.
    pub host: String,
    /// HTTP port for the pinglist / address store API.
    pub port_control: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamConfig {
    /// How often agents push their addresses and pull the lists.
    pub interval_sync_pinglist_sec: u64,
    /// How often the server re-reads the pinglist source.
    pub interval_read_pinglist_sec: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// YAML pinglist read by the server.
    pub pinglist: PathBuf,
    /// Agent-side directory of per-IP endpoint files to register.
    pub upload_dir: PathBuf,
    /// Agent-side directory where fetched lists are written as YAML.
    pub download_dir: PathBuf,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port_control: 8080,
        }
    }
}

impl Default for ParamConfig {
    fn default() -> Self {
        Self {
            interval_sync_pinglist_sec: DEFAULT_INTERVAL_SECS,
            interval_read_pinglist_sec: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pinglist: data_dir().join("pinglist.yaml"),
            upload_dir: data_dir().join("upload"),
            download_dir: data_dir().join("download"),
        }
    }
}

impl ParamConfig {
    /// Pinglist re-read period. Never zero.
    pub fn read_interval(&self) -> Duration {
        Duration::from_secs(self.interval_read_pinglist_sec.max(1))
    }

    /// Agent sync period. Never zero.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.interval_sync_pinglist_sec.max(1))
    }
}

impl ControllerConfig {
    /// `host:port` form used both for binding and for agent URLs.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port_control)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("pingweave")
}

pub fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".local").join("share"))
        .join("pingweave")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl PingweaveConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a config file. A missing file yields defaults.
    pub fn load_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(PingweaveConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("PINGWEAVE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&PingweaveConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply PINGWEAVE_* env var overrides. Unparsable values are ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PINGWEAVE_CONTROLLER__HOST") {
            self.controller.host = v;
        }
        if let Ok(v) = std::env::var("PINGWEAVE_CONTROLLER__PORT_CONTROL") {
            if let Ok(p) = v.parse() {
                self.controller.port_control = p;
            }
        }
        if let Ok(v) = std::env::var("PINGWEAVE_PARAM__INTERVAL_SYNC_PINGLIST_SEC") {
            if let Ok(s) = v.parse() {
                self.param.interval_sync_pinglist_sec = s;
            }
        }
        if let Ok(v) = std::env::var("PINGWEAVE_PARAM__INTERVAL_READ_PINGLIST_SEC") {
            if let Ok(s) = v.parse() {
                self.param.interval_read_pinglist_sec = s;
            }
        }
        if let Ok(v) = std::env::var("PINGWEAVE_PATHS__PINGLIST") {
            self.paths.pinglist = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("PINGWEAVE_PATHS__UPLOAD_DIR") {
            self.paths.upload_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("PINGWEAVE_PATHS__DOWNLOAD_DIR") {
            self.paths.download_dir = PathBuf::from(v);
        }
    }
}
