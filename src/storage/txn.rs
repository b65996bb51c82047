//! Scoped all-or-nothing write unit
//!
//! A `StoreTransaction` works on a copy of the tables. `commit` seals and
//! atomically writes the copy, then publishes it to the store. Dropping the
//! unit without committing discards every change.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::LedgerResult;
use crate::models::{Account, Money, Transaction, TransactionId};

use super::tables::LedgerTables;
use super::LedgerStore;

pub struct StoreTransaction<'a> {
    store: &'a mut LedgerStore,
    working: LedgerTables,
    finished: bool,
}

impl<'a> StoreTransaction<'a> {
    pub(super) fn begin(store: &'a mut LedgerStore) -> Self {
        let working = store.tables.clone();
        Self {
            store,
            working,
            finished: false,
        }
    }

    /// Totals row as seen inside this unit
    pub fn get_total(&self, account_name: &str) -> Option<&Account> {
        self.working.get_total(account_name)
    }

    pub fn get_transaction(&self, account_name: &str, id: TransactionId) -> Option<&Transaction> {
        self.working.get_transaction(account_name, id)
    }

    pub fn upsert_total(&mut self, account_name: &str, amount: Money, timestamp: DateTime<Utc>) {
        self.working.upsert_total(account_name, amount, timestamp);
    }

    /// Insert a row; fails with `NotFound` when the account has no totals row
    pub fn insert_transaction(
        &mut self,
        account_name: &str,
        amount: Money,
        comment: &str,
        timestamp: DateTime<Utc>,
    ) -> LedgerResult<TransactionId> {
        self.working
            .insert_transaction(account_name, amount, comment, timestamp)
    }

    pub fn delete_transaction(&mut self, account_name: &str, id: TransactionId) -> Option<Transaction> {
        self.working.delete_transaction(account_name, id)
    }

    /// Persist the working copy and make it visible
    ///
    /// On error nothing is published and the file on disk is untouched.
    pub fn commit(mut self) -> LedgerResult<()> {
        self.store.persist(&self.working)?;
        self.store.tables = std::mem::take(&mut self.working);
        self.finished = true;
        debug!(path = %self.store.path().display(), "Committed store transaction");
        Ok(())
    }

    /// Discard the working copy explicitly
    pub fn rollback(mut self) {
        self.finished = true;
        debug!("Rolled back store transaction");
    }
}

impl Drop for StoreTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!("Store transaction dropped without commit; changes discarded");
        }
    }
}
