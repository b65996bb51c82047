//! Encrypted ledger storage
//!
//! One database file per username. The file holds the key-derivation
//! parameters in the clear and the tables sealed with AES-256-GCM. Reads
//! are served from memory; every write goes through a `StoreTransaction`
//! that rewrites the whole file atomically on commit.

pub mod file_io;
mod tables;
mod txn;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::config::KdfSettings;
use crate::crypto::{decrypt, derive_key, encrypt, DerivedKey, EncryptedData, KeyDerivationParams};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Money, Transaction, TransactionId};

pub use file_io::{read_json_required, write_json_atomic};
pub use tables::SortOrder;
pub use txn::StoreTransaction;

use tables::{LedgerTables, TablesData};

/// Current on-disk format
const FORMAT_VERSION: u32 = 1;

/// On-disk layout of a database file
#[derive(Debug, Serialize, Deserialize)]
struct DatabaseFile {
    format_version: u32,
    key_params: KeyDerivationParams,
    payload: EncryptedData,
}

/// Handle to an open, decrypted ledger database
pub struct LedgerStore {
    path: PathBuf,
    key: DerivedKey,
    key_params: KeyDerivationParams,
    tables: LedgerTables,
}

impl LedgerStore {
    /// Open the database at `path`, creating it if it doesn't exist
    ///
    /// # Errors
    ///
    /// - `Auth` when the passphrase does not decrypt an existing file
    /// - `Io` when the path cannot be read or written
    /// - `Storage` when the file is not a ledger database
    pub fn open(
        path: impl Into<PathBuf>,
        passphrase: &str,
        kdf: &KdfSettings,
    ) -> LedgerResult<Self> {
        let path = path.into();

        if path.exists() {
            Self::load(path, passphrase)
        } else {
            Self::create(path, passphrase, kdf)
        }
    }

    fn load(path: PathBuf, passphrase: &str) -> LedgerResult<Self> {
        let file: DatabaseFile = read_json_required(&path)?;
        if file.format_version != FORMAT_VERSION {
            return Err(LedgerError::Storage(format!(
                "Unsupported database format version: {}",
                file.format_version
            )));
        }

        let key = derive_key(passphrase, &file.key_params)?;
        let mut plaintext = decrypt(&file.payload, &key)?;
        let parsed = serde_json::from_slice::<TablesData>(&plaintext);
        plaintext.zeroize();

        let data = parsed
            .map_err(|e| LedgerError::Storage(format!("Corrupted database payload: {}", e)))?;
        let tables = LedgerTables::from_data(data)?;

        info!(path = %path.display(), "Opened ledger database");
        Ok(Self {
            path,
            key,
            key_params: file.key_params,
            tables,
        })
    }

    fn create(path: PathBuf, passphrase: &str, kdf: &KdfSettings) -> LedgerResult<Self> {
        let key_params = KeyDerivationParams::generate(kdf);
        let key = derive_key(passphrase, &key_params)?;

        let store = Self {
            path,
            key,
            key_params,
            tables: LedgerTables::default(),
        };
        store.persist(&store.tables)?;

        info!(path = %store.path.display(), "Created ledger database");
        Ok(store)
    }

    /// Seal the given tables and atomically replace the database file
    fn persist(&self, tables: &LedgerTables) -> LedgerResult<()> {
        let mut plaintext = serde_json::to_vec(&tables.to_data())?;
        let sealed = encrypt(&plaintext, &self.key);
        plaintext.zeroize();

        let file = DatabaseFile {
            format_version: FORMAT_VERSION,
            key_params: self.key_params.clone(),
            payload: sealed?,
        };
        write_json_atomic(&self.path, &file)?;
        debug!(path = %self.path.display(), "Persisted ledger database");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a scoped write unit
    pub fn begin(&mut self) -> StoreTransaction<'_> {
        StoreTransaction::begin(self)
    }

    pub fn get_total(&self, account_name: &str) -> Option<Account> {
        self.tables.get_total(account_name).cloned()
    }

    /// Insert or update a totals row in its own unit
    pub fn upsert_total(
        &mut self,
        account_name: &str,
        amount: Money,
        timestamp: DateTime<Utc>,
    ) -> LedgerResult<()> {
        let mut txn = self.begin();
        txn.upsert_total(account_name, amount, timestamp);
        txn.commit()
    }

    pub fn get_transaction(&self, account_name: &str, id: TransactionId) -> Option<Transaction> {
        self.tables.get_transaction(account_name, id).cloned()
    }

    pub fn list_transactions(
        &self,
        account_name: &str,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Vec<Transaction> {
        self.tables.list_transactions(account_name, order, limit)
    }

    pub fn count_transactions(&self, account_name: &str) -> usize {
        self.tables.count_transactions(account_name)
    }

    /// Account names in the totals index, sorted
    pub fn list_accounts(&self) -> Vec<String> {
        self.tables.list_accounts()
    }

    /// Balance recomputed from the transaction rows
    pub fn sum_transactions(&self, account_name: &str) -> Option<Money> {
        self.tables.sum_transactions(account_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key_derivation::test_kdf;
    use tempfile::TempDir;

    fn db_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("data").join("alice_ledger.db")
    }

    #[test]
    fn test_open_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir);

        let store = LedgerStore::open(&path, "pw", &test_kdf()).unwrap();
        assert!(path.exists());
        assert!(store.list_accounts().is_empty());
    }

    #[test]
    fn test_file_does_not_leak_plaintext() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir);

        let mut store = LedgerStore::open(&path, "pw", &test_kdf()).unwrap();
        let mut txn = store.begin();
        txn.upsert_total("groceries", Money::zero(), Utc::now());
        txn.insert_transaction("groceries", Money::from_cents(-999), "secret-comment", Utc::now())
            .unwrap();
        txn.commit().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("groceries"));
        assert!(!raw.contains("secret-comment"));
    }

    #[test]
    fn test_reopen_restores_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir);
        let now = Utc::now();

        {
            let mut store = LedgerStore::open(&path, "pw", &test_kdf()).unwrap();
            let mut txn = store.begin();
            txn.upsert_total("alice", Money::zero(), now);
            txn.insert_transaction("alice", Money::from_cents(5000), "salary", now)
                .unwrap();
            txn.upsert_total("alice", Money::from_cents(5000), now);
            txn.commit().unwrap();
        }

        let store = LedgerStore::open(&path, "pw", &test_kdf()).unwrap();
        assert_eq!(store.list_accounts(), vec!["alice".to_string()]);
        assert_eq!(
            store.get_total("alice").unwrap().balance,
            Money::from_cents(5000)
        );
        let rows = store.list_transactions("alice", SortOrder::Ascending, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].comment, "salary");
        assert_eq!(rows[0].timestamp, now);

        let row = store.get_transaction("alice", rows[0].id).unwrap();
        assert_eq!(row, rows[0]);
        assert!(store.get_transaction("bob", rows[0].id).is_none());
    }

    #[test]
    fn test_wrong_passphrase_is_auth_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir);
        LedgerStore::open(&path, "right", &test_kdf()).unwrap();

        let err = LedgerStore::open(&path, "wrong", &test_kdf()).err().unwrap();
        assert!(err.is_auth());
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("data");
        std::fs::write(&blocker, "file where a directory should be").unwrap();

        let err = LedgerStore::open(blocker.join("alice_ledger.db"), "pw", &test_kdf())
            .err()
            .unwrap();
        assert!(matches!(err, LedgerError::Io(_)));

        // A directory at the database path cannot be opened either
        let dir_path = temp_dir.path().join("dir_ledger.db");
        std::fs::create_dir(&dir_path).unwrap();
        let err = LedgerStore::open(&dir_path, "pw", &test_kdf()).err().unwrap();
        assert!(matches!(err, LedgerError::Io(_)));
    }

    #[test]
    fn test_dropped_unit_rolls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir);
        let mut store = LedgerStore::open(&path, "pw", &test_kdf()).unwrap();
        store.upsert_total("alice", Money::zero(), Utc::now()).unwrap();

        {
            let mut txn = store.begin();
            txn.insert_transaction("alice", Money::from_cents(100), "", Utc::now())
                .unwrap();
            txn.upsert_total("alice", Money::from_cents(100), Utc::now());
            assert_eq!(
                txn.get_total("alice").unwrap().balance,
                Money::from_cents(100)
            );
        }

        assert_eq!(store.count_transactions("alice"), 0);
        assert!(store.get_total("alice").unwrap().balance.is_zero());

        let reopened = LedgerStore::open(&path, "pw", &test_kdf()).unwrap();
        assert_eq!(reopened.count_transactions("alice"), 0);
    }

    #[test]
    fn test_explicit_rollback() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = LedgerStore::open(db_path(&temp_dir), "pw", &test_kdf()).unwrap();

        let mut txn = store.begin();
        txn.upsert_total("bob", Money::zero(), Utc::now());
        txn.rollback();

        assert!(store.get_total("bob").is_none());
    }

    #[test]
    fn test_failed_commit_keeps_previous_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir);
        let mut store = LedgerStore::open(&path, "pw", &test_kdf()).unwrap();
        store.upsert_total("alice", Money::zero(), Utc::now()).unwrap();

        // Replace the data directory with a file so the write cannot land
        std::fs::remove_dir_all(temp_dir.path().join("data")).unwrap();
        std::fs::write(temp_dir.path().join("data"), "blocked").unwrap();

        let mut txn = store.begin();
        txn.insert_transaction("alice", Money::from_cents(100), "", Utc::now())
            .unwrap();
        txn.upsert_total("alice", Money::from_cents(100), Utc::now());
        assert!(matches!(txn.commit(), Err(LedgerError::Io(_))));

        assert_eq!(store.count_transactions("alice"), 0);
        assert!(store.get_total("alice").unwrap().balance.is_zero());
    }

    #[test]
    fn test_unsupported_format_version() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir);
        LedgerStore::open(&path, "pw", &test_kdf()).unwrap();

        let mut raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        raw["format_version"] = serde_json::json!(99);
        std::fs::write(&path, raw.to_string()).unwrap();

        let err = LedgerStore::open(&path, "pw", &test_kdf()).err().unwrap();
        assert!(matches!(err, LedgerError::Storage(_)));
    }
}
