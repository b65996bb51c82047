//! Path management for the ledger
//!
//! ## Path Resolution Order
//!
//! 1. `LEDGER_CLI_DATA_DIR` environment variable (if set)
//! 2. The platform data directory for `ledger-cli` (via `directories`)
//!
//! Each username gets its own encrypted database file under `data/`.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::LedgerError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "LEDGER_CLI_DATA_DIR";

/// Manages all paths used by the ledger
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Resolve the base directory from the environment or the platform
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, LedgerError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "ledger-cli")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| {
                    LedgerError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create LedgerPaths with a custom base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the per-user database files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Database file for a username
    ///
    /// Usernames are case-insensitive and must not escape the data
    /// directory.
    pub fn database_file(&self, username: &str) -> Result<PathBuf, LedgerError> {
        let username = normalize_username(username)?;
        Ok(self.data_dir().join(format!("{}_ledger.db", username)))
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), LedgerError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| LedgerError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| LedgerError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

/// Lower-case a username and reject anything that is not a plain file stem
pub fn normalize_username(username: &str) -> Result<String, LedgerError> {
    let username = username.trim().to_lowercase();

    if username.is_empty() {
        return Err(LedgerError::InvalidArgument(
            "Username cannot be empty".into(),
        ));
    }

    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !username.starts_with('.');

    if !valid {
        return Err(LedgerError::InvalidArgument(format!(
            "Invalid username '{}': use letters, digits, '-', '_' or '.'",
            username
        )));
    }

    Ok(username)
}
