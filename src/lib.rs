//! ledger-cli - encrypted personal ledger
//!
//! A per-user encrypted database of named accounts, each with a cached
//! balance and a history of signed transactions, driven from an
//! interactive shell.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `crypto`: Key derivation and authenticated encryption
//! - `models`: Core data models (money, accounts, transactions)
//! - `storage`: Encrypted single-file store with scoped write units
//! - `services`: Business logic layer
//! - `display`: Terminal formatting
//! - `cli`: Shell command grammar and the interactive loop
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_cli::config::{LedgerPaths, Settings};
//! use ledger_cli::services::AccountService;
//! use ledger_cli::storage::LedgerStore;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let store = LedgerStore::open(paths.database_file("alice")?, "passphrase", &settings.kdf)?;
//! let mut service = AccountService::new(store);
//! service.select_or_create_account("groceries")?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
