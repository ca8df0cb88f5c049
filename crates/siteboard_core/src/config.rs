//! # Core configuration (`siteboard.toml`)
//!
//! ```toml
//! [storage]
//! db_path = "siteboard.sqlite3"   # ":memory:" keeps the durable tier in RAM
//!
//! [logging]
//! level = "info"
//! dir = "/var/log/siteboard"      # logging stays off when omitted
//! ```
//!
//! Every field has a default, so a missing or empty file is equivalent to
//! [`CoreConfig::default`].

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, init_logging};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const IN_MEMORY_DB_PATH: &str = ":memory:";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file backing the durable tier, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "siteboard.sqlite3".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Absolute directory for rolling log files.
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl CoreConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "siteboard.toml"
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Parse)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reads and parses a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn is_in_memory(&self) -> bool {
        self.storage.db_path.trim() == IN_MEMORY_DB_PATH
    }

    /// Opens the durable tier's database with migrations applied.
    pub fn open_storage(&self) -> DbResult<Connection> {
        if self.is_in_memory() {
            return open_db_in_memory();
        }
        open_db(self.storage.db_path.trim())
    }

    /// Starts file logging when a directory is configured.
    ///
    /// Returns `Ok(false)` when logging is left off.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(dir) = self.logging.dir.as_deref() else {
            return Ok(false);
        };
        init_logging(&self.logging.level, dir)?;
        Ok(true)
    }
}
