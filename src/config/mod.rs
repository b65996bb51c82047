//! Configuration module
//!
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::{KdfSettings, Settings};
