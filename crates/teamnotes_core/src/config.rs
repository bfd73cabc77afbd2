//! Runtime configuration loaded from a TOML file.
//!
//! # Invariants
//! - A missing config file yields defaults, never an error.
//! - `TEAMNOTES_DB_PATH` wins over the file's `db_path`.

use crate::db::{open_db_in_memory, open_db_with_timeout, DbResult};
use crate::logging::default_log_level;
use rusqlite::Connection;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `db_path`.
pub const DB_PATH_ENV: &str = "TEAMNOTES_DB_PATH";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file. `None` keeps the store in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl CoreConfig {
    /// Loads config from `path`, then applies the environment override.
    ///
    /// # Errors
    /// - `ConfigError::Read` when the file exists but cannot be read.
    /// - `ConfigError::Parse` when the file is not valid config TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&contents).map_err(|err| match err {
                ConfigError::Parse { message, .. } => ConfigError::Parse {
                    path: Some(path.to_path_buf()),
                    message,
                },
                other => other,
            })?
        } else {
            Self::default()
        };
        Ok(config.with_db_path_override(std::env::var(DB_PATH_ENV).ok()))
    }

    /// Parses config text without touching the environment.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|err| ConfigError::Parse {
            path: None,
            message: err.to_string(),
        })
    }

    /// Replaces `db_path` when `value` is a non-blank path.
    pub fn with_db_path_override(mut self, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
            self.db_path = Some(PathBuf::from(value.trim()));
        }
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Opens and migrates the configured store.
    pub fn open_store(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db_with_timeout(path, self.busy_timeout()),
            None => open_db_in_memory(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config file `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                message,
            } => write!(f, "failed to parse config file `{}`: {message}", path.display()),
            Self::Parse {
                path: None,
                message,
            } => write!(f, "failed to parse config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}
