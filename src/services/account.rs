//! Account service
//!
//! Owns the open store and the active-account selection. Every operation
//! that changes a balance writes the transaction row and the totals row in
//! one store unit, so the cached balance always equals the sum of the
//! account's transactions.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Money, Transaction, TransactionId};
use crate::storage::{LedgerStore, SortOrder};

/// How much history `list_recent` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowLimit {
    /// The n most recent transactions, newest first
    Last(usize),
    /// Full history, oldest first
    All,
}

impl ShowLimit {
    /// Parse a positive integer or the literal `all`
    pub fn parse(s: &str) -> LedgerResult<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Self::Last(n)),
            _ => Err(LedgerError::InvalidArgument(format!(
                "'{}' is not a positive number or 'all'",
                s
            ))),
        }
    }
}

impl FromStr for ShowLimit {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ShowLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Last(n) => write!(f, "{}", n),
            Self::All => write!(f, "all"),
        }
    }
}

fn out_of_range() -> LedgerError {
    LedgerError::InvalidArgument("amount out of range".to_string())
}

/// Result of selecting an account
#[derive(Debug, Clone)]
pub struct Selection {
    pub account: Account,
    /// True when this call created the account
    pub created: bool,
}

/// Result of adding or deleting a transaction
#[derive(Debug, Clone)]
pub struct BalanceChange {
    /// The row that was added or removed (its amount keeps its sign)
    pub transaction: Transaction,
    /// Cached balance after the change
    pub balance: Money,
}

/// Transaction count of one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub account_name: String,
    pub transaction_count: usize,
}

/// Service for account and transaction bookkeeping
pub struct AccountService {
    store: LedgerStore,
    active: Option<String>,
}

impl AccountService {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            store,
            active: None,
        }
    }

    /// Read-only access to the underlying store
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn active_account(&self) -> Option<&str> {
        self.active.as_deref()
    }

    fn require_active(&self) -> LedgerResult<String> {
        self.active.clone().ok_or(LedgerError::NoActiveAccount)
    }

    /// Cached balance of the active account
    pub fn balance(&self) -> LedgerResult<Money> {
        let name = self.require_active()?;
        self.store
            .get_total(&name)
            .map(|account| account.balance)
            .ok_or_else(|| LedgerError::account_not_found(name))
    }

    /// Select an account, creating it with a zero balance if unknown
    pub fn select_or_create_account(&mut self, name: &str) -> LedgerResult<Selection> {
        let name = name.trim();
        Account::validate_name(name).map_err(|e| LedgerError::InvalidArgument(e.to_string()))?;

        let selection = match self.store.get_total(name) {
            Some(account) => Selection {
                account,
                created: false,
            },
            None => {
                let now = Utc::now();
                let mut txn = self.store.begin();
                txn.upsert_total(name, Money::zero(), now);
                txn.commit()?;
                info!(account = name, "Created account");
                Selection {
                    account: Account::new(name, now),
                    created: true,
                }
            }
        };

        self.active = Some(name.to_string());
        debug!(account = name, "Selected account");
        Ok(selection)
    }

    /// Clear the active account, returning the name that was selected
    pub fn deselect(&mut self) -> LedgerResult<String> {
        self.active.take().ok_or(LedgerError::NoActiveAccount)
    }

    /// Append a transaction to the active account
    pub fn add_transaction(&mut self, amount: Money, comment: &str) -> LedgerResult<BalanceChange> {
        let name = self.require_active()?;
        let now = Utc::now();

        let mut txn = self.store.begin();
        let previous = txn
            .get_total(&name)
            .map(|account| account.balance)
            .ok_or_else(|| LedgerError::account_not_found(name.as_str()))?;

        let balance = previous.checked_add(amount).ok_or_else(out_of_range)?;
        let id = txn.insert_transaction(&name, amount, comment.trim(), now)?;
        txn.upsert_total(&name, balance, now);

        let transaction = txn
            .get_transaction(&name, id)
            .cloned()
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;
        txn.commit()?;

        debug!(account = %name, %id, "Added transaction");
        Ok(BalanceChange {
            transaction,
            balance,
        })
    }

    /// Remove a transaction of the active account and reverse its amount
    pub fn delete_transaction(&mut self, id: TransactionId) -> LedgerResult<BalanceChange> {
        let name = self.require_active()?;

        let mut txn = self.store.begin();
        let removed = txn
            .delete_transaction(&name, id)
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;
        let previous = txn
            .get_total(&name)
            .map(|account| account.balance)
            .ok_or_else(|| LedgerError::account_not_found(name.as_str()))?;

        let balance = previous
            .checked_sub(removed.amount)
            .ok_or_else(out_of_range)?;
        txn.upsert_total(&name, balance, Utc::now());
        txn.commit()?;

        debug!(account = %name, %id, "Deleted transaction");
        Ok(BalanceChange {
            transaction: removed,
            balance,
        })
    }

    /// Recent history of the active account
    pub fn list_recent(&self, limit: ShowLimit) -> LedgerResult<Vec<Transaction>> {
        let name = self.require_active()?;

        Ok(match limit {
            ShowLimit::Last(n) => self
                .store
                .list_transactions(&name, SortOrder::Descending, Some(n)),
            ShowLimit::All => self.store.list_transactions(&name, SortOrder::Ascending, None),
        })
    }

    /// Names of all known accounts
    pub fn list_accounts(&self) -> Vec<String> {
        self.store.list_accounts()
    }

    /// Count the transactions of the named account, or of the active one
    pub fn inspect(&self, name: Option<&str>) -> LedgerResult<Inspection> {
        let account_name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => self.require_active()?,
        };

        if self.store.get_total(&account_name).is_none() {
            return Err(LedgerError::account_not_found(account_name));
        }

        Ok(Inspection {
            transaction_count: self.store.count_transactions(&account_name),
            account_name,
        })
    }
}
