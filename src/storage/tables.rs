//! In-memory tables of a ledger database
//!
//! Two tables: `totals` (one row per account, keyed by name) and
//! `transactions` (keyed by id, indexed by `account_name`). A transaction
//! row may only reference an account that has a totals row.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Money, Transaction, TransactionId};

/// Ordering of a history listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first
    Ascending,
    /// Newest first
    Descending,
}

/// Serialized form of the tables, sealed inside the encrypted payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct TablesData {
    next_id: u64,
    totals: Vec<Account>,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LedgerTables {
    next_id: u64,
    totals: BTreeMap<String, Account>,
    transactions: BTreeMap<TransactionId, Transaction>,
    /// Index: account_name -> transaction ids
    by_account: HashMap<String, BTreeSet<TransactionId>>,
}

impl LedgerTables {
    /// Rebuild tables and indexes from their serialized form
    pub fn from_data(data: TablesData) -> LedgerResult<Self> {
        let mut tables = Self {
            next_id: data.next_id.max(1),
            ..Self::default()
        };

        for account in data.totals {
            tables.totals.insert(account.name.clone(), account);
        }

        for txn in data.transactions {
            if !tables.totals.contains_key(&txn.account_name) {
                return Err(LedgerError::Storage(format!(
                    "Transaction {} references unknown account '{}'",
                    txn.id, txn.account_name
                )));
            }
            if txn.id.value() >= tables.next_id {
                return Err(LedgerError::Storage(format!(
                    "Transaction id {} is beyond the id counter",
                    txn.id
                )));
            }
            let id = txn.id;
            tables
                .by_account
                .entry(txn.account_name.clone())
                .or_default()
                .insert(id);
            if tables.transactions.insert(id, txn).is_some() {
                return Err(LedgerError::Storage(format!(
                    "Duplicate transaction id {}",
                    id
                )));
            }
        }

        for account in tables.totals.values() {
            let sum = tables.sum_transactions(&account.name);
            if sum != Some(account.balance) {
                warn!(
                    account = %account.name,
                    "Cached balance does not match transaction history"
                );
            }
        }

        Ok(tables)
    }

    pub fn to_data(&self) -> TablesData {
        TablesData {
            next_id: self.next_id,
            totals: self.totals.values().cloned().collect(),
            transactions: self.transactions.values().cloned().collect(),
        }
    }

    pub fn get_total(&self, account_name: &str) -> Option<&Account> {
        self.totals.get(account_name)
    }

    /// Insert or update the totals row for an account
    pub fn upsert_total(&mut self, account_name: &str, amount: Money, timestamp: DateTime<Utc>) {
        self.totals
            .entry(account_name.to_string())
            .and_modify(|account| {
                account.balance = amount;
                account.updated_at = timestamp;
            })
            .or_insert_with(|| Account {
                balance: amount,
                ..Account::new(account_name, timestamp)
            });
    }

    pub fn insert_transaction(
        &mut self,
        account_name: &str,
        amount: Money,
        comment: &str,
        timestamp: DateTime<Utc>,
    ) -> LedgerResult<TransactionId> {
        if !self.totals.contains_key(account_name) {
            return Err(LedgerError::account_not_found(account_name));
        }

        let id = TransactionId::new(self.next_id.max(1));
        self.next_id = id.next().value();

        self.transactions.insert(
            id,
            Transaction {
                id,
                account_name: account_name.to_string(),
                amount,
                comment: comment.to_string(),
                timestamp,
            },
        );
        self.by_account
            .entry(account_name.to_string())
            .or_default()
            .insert(id);

        Ok(id)
    }

    /// Look up a transaction, only if it belongs to the given account
    pub fn get_transaction(&self, account_name: &str, id: TransactionId) -> Option<&Transaction> {
        self.transactions
            .get(&id)
            .filter(|txn| txn.account_name == account_name)
    }

    pub fn delete_transaction(&mut self, account_name: &str, id: TransactionId) -> Option<Transaction> {
        self.get_transaction(account_name, id)?;

        if let Some(ids) = self.by_account.get_mut(account_name) {
            ids.remove(&id);
        }
        self.transactions.remove(&id)
    }

    pub fn list_transactions(
        &self,
        account_name: &str,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Vec<Transaction> {
        let mut rows: Vec<&Transaction> = self
            .by_account
            .get(account_name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.transactions.get(id))
            .collect();

        rows.sort_by_key(|txn| txn.sort_key());
        if order == SortOrder::Descending {
            rows.reverse();
        }

        rows.into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub fn count_transactions(&self, account_name: &str) -> usize {
        self.by_account.get(account_name).map_or(0, BTreeSet::len)
    }

    pub fn list_accounts(&self) -> Vec<String> {
        self.totals.keys().cloned().collect()
    }

    /// Recompute an account's balance from its transaction rows
    ///
    /// `None` when the total is out of range.
    pub fn sum_transactions(&self, account_name: &str) -> Option<Money> {
        Money::checked_sum(
            self.by_account
                .get(account_name)
                .into_iter()
                .flatten()
                .filter_map(|id| self.transactions.get(id))
                .map(|txn| txn.amount),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tables_with_account(name: &str) -> LedgerTables {
        let mut tables = LedgerTables::default();
        tables.upsert_total(name, Money::zero(), Utc::now());
        tables
    }

    #[test]
    fn test_upsert_total_is_idempotent_by_name() {
        let mut tables = LedgerTables::default();
        let created = Utc::now();
        tables.upsert_total("alice", Money::zero(), created);
        tables.upsert_total("alice", Money::from_cents(500), created + Duration::seconds(5));

        assert_eq!(tables.list_accounts(), vec!["alice".to_string()]);
        let account = tables.get_total("alice").unwrap();
        assert_eq!(account.balance, Money::from_cents(500));
        assert_eq!(account.created_at, created);
        assert_eq!(account.updated_at, created + Duration::seconds(5));
    }

    #[test]
    fn test_insert_requires_totals_row() {
        let mut tables = LedgerTables::default();
        let err = tables
            .insert_transaction("ghost", Money::from_cents(100), "", Utc::now())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut tables = tables_with_account("alice");
        let now = Utc::now();
        let first = tables
            .insert_transaction("alice", Money::from_cents(100), "a", now)
            .unwrap();
        tables.delete_transaction("alice", first).unwrap();
        let second = tables
            .insert_transaction("alice", Money::from_cents(100), "b", now)
            .unwrap();

        assert_eq!(first, TransactionId::new(1));
        assert_eq!(second, TransactionId::new(2));
    }

    #[test]
    fn test_delete_is_scoped_to_account() {
        let mut tables = tables_with_account("alice");
        tables.upsert_total("bob", Money::zero(), Utc::now());
        let id = tables
            .insert_transaction("alice", Money::from_cents(100), "", Utc::now())
            .unwrap();

        assert!(tables.delete_transaction("bob", id).is_none());
        assert_eq!(tables.count_transactions("alice"), 1);
        assert!(tables.delete_transaction("alice", id).is_some());
        assert_eq!(tables.count_transactions("alice"), 0);
    }

    #[test]
    fn test_list_orders_and_limits() {
        let mut tables = tables_with_account("alice");
        let start = Utc::now();
        for (offset, cents) in [(2, 300), (0, 100), (1, 200)] {
            tables
                .insert_transaction(
                    "alice",
                    Money::from_cents(cents),
                    "",
                    start + Duration::seconds(offset),
                )
                .unwrap();
        }

        let ascending: Vec<i64> = tables
            .list_transactions("alice", SortOrder::Ascending, None)
            .iter()
            .map(|t| t.amount.cents())
            .collect();
        assert_eq!(ascending, vec![100, 200, 300]);

        let latest: Vec<i64> = tables
            .list_transactions("alice", SortOrder::Descending, Some(2))
            .iter()
            .map(|t| t.amount.cents())
            .collect();
        assert_eq!(latest, vec![300, 200]);

        assert!(tables
            .list_transactions("nobody", SortOrder::Ascending, None)
            .is_empty());
    }

    #[test]
    fn test_data_round_trip_rebuilds_index() {
        let mut tables = tables_with_account("alice");
        tables
            .insert_transaction("alice", Money::from_cents(-250), "coffee", Utc::now())
            .unwrap();

        let json = serde_json::to_string(&tables.to_data()).unwrap();
        let data: TablesData = serde_json::from_str(&json).unwrap();
        let restored = LedgerTables::from_data(data).unwrap();

        assert_eq!(restored.count_transactions("alice"), 1);
        assert_eq!(restored.sum_transactions("alice"), Some(Money::from_cents(-250)));
        assert_eq!(restored.next_id, tables.next_id);
    }

    #[test]
    fn test_from_data_rejects_orphan_rows() {
        let mut tables = tables_with_account("alice");
        tables
            .insert_transaction("alice", Money::from_cents(100), "", Utc::now())
            .unwrap();
        let mut data = tables.to_data();
        data.totals.clear();

        assert!(matches!(
            LedgerTables::from_data(data),
            Err(LedgerError::Storage(_))
        ));
    }
}
