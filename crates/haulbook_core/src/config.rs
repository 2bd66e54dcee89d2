//! Process configuration from environment variables.
//!
//! # Responsibility
//! - Resolve the database path, log level and log directory.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - An unknown log level is rejected, not silently downgraded.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "HAULBOOK_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "HAULBOOK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "HAULBOOK_LOG_DIR";

const DEFAULT_DB_FILE: &str = "haulbook.sqlite3";

/// Resolved settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaulbookConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl HaulbookConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoggingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let log_level = match read(LOG_LEVEL_VAR) {
            Some(level) => normalize_level(&level)?,
            None => default_log_level(),
        };
        let log_dir = read(LOG_DIR_VAR).map(PathBuf::from);

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

/// Default database file inside the system temp directory.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE)
}
