//! Runtime configuration, loaded from an optional `sandshell.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ShellError};

/// Default cap on the number of bytes `cat` will return (200 KiB).
pub const DEFAULT_MAX_CAT_BYTES: u64 = 200 * 1024;

/// Default maximum number of process lines printed by `ps`.
pub const DEFAULT_PROCESS_LIMIT: usize = 50;

/// Default truncation width for process names in `ps` output.
pub const DEFAULT_PROCESS_NAME_WIDTH: usize = 30;

/// Default cap on live HTTP sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 100;

/// Default idle time before an HTTP session is dropped (30 minutes).
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[sandbox]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct SandboxConfig {
    /// Sandbox root directory. Created if absent.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Largest file `cat` will print.
    #[serde(default = "default_max_cat_bytes")]
    pub max_cat_bytes: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            max_cat_bytes: default_max_cat_bytes(),
        }
    }
}

/// `[system]` table: limits for the informational commands.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_process_limit")]
    pub process_limit: usize,
    #[serde(default = "default_process_name_width")]
    pub process_name_width: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            process_limit: default_process_limit(),
            process_name_width: default_process_name_width(),
        }
    }
}

/// `[server]` table for the HTTP front end.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Live sessions kept at once; the least recently used is evicted.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("sandbox")
}

fn default_max_cat_bytes() -> u64 {
    DEFAULT_MAX_CAT_BYTES
}

fn default_process_limit() -> usize {
    DEFAULT_PROCESS_LIMIT
}

fn default_process_name_width() -> usize {
    DEFAULT_PROCESS_NAME_WIDTH
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

fn default_session_idle_secs() -> u64 {
    DEFAULT_SESSION_IDLE_SECS
}

impl ShellConfig {
    /// Parse a configuration document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loaded config from {}", path.display());
                Self::from_toml_str(&text)
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            },
            Err(e) => Err(ShellError::Config(format!("{}: {e}", path.display()))),
        }
    }
}
