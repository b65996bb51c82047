//! User settings for the ledger
//!
//! Manages display preferences, the default username, and the key
//! derivation cost used when a new database is created.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::storage::file_io::write_json_atomic;

/// Argon2id cost parameters for newly created databases
///
/// Existing databases keep the parameters stored in their header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfSettings {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    /// Iterations (default: 3)
    pub time_cost: u32,
    /// Parallelism degree (default: 4)
    pub parallelism: u32,
}

impl Default for KdfSettings {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// strftime format for transaction timestamps
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,

    /// Username used when none is passed on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_user: Option<String>,

    /// Key derivation cost for new databases
    #[serde(default)]
    pub kdf: KdfSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            datetime_format: default_datetime_format(),
            default_user: None,
            kdf: KdfSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| LedgerError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
