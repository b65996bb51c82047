//! Transaction model
//!
//! A transaction is a single signed entry owned by exactly one account.
//! Ids are assigned by the store from a monotonically increasing counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Money;

/// Store-assigned transaction id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    /// Owning account (indexed foreign key into the totals table)
    pub account_name: String,

    /// Positive for income, negative for spending
    pub amount: Money,

    #[serde(default)]
    pub comment: String,

    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Ordering key used by history listings; ids break timestamp ties
    pub fn sort_key(&self) -> (DateTime<Utc>, TransactionId) {
        (self.timestamp, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse() {
        assert_eq!("42".parse::<TransactionId>().unwrap(), TransactionId::new(42));
        assert_eq!(" 7 ".parse::<TransactionId>().unwrap().value(), 7);
        assert!("-1".parse::<TransactionId>().is_err());
        assert!("abc".parse::<TransactionId>().is_err());
    }

    #[test]
    fn test_id_next() {
        assert_eq!(TransactionId::new(1).next(), TransactionId::new(2));
    }

    #[test]
    fn test_sort_key_breaks_ties_by_id() {
        let now = Utc::now();
        let first = Transaction {
            id: TransactionId::new(1),
            account_name: "alice".into(),
            amount: Money::from_cents(100),
            comment: String::new(),
            timestamp: now,
        };
        let second = Transaction {
            id: TransactionId::new(2),
            ..first.clone()
        };
        assert!(first.sort_key() < second.sort_key());
    }

    #[test]
    fn test_comment_defaults_when_missing() {
        let json = r#"{"id":3,"account_name":"a","amount":-250,"timestamp":"2024-01-15T10:00:00Z"}"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.comment, "");
        assert_eq!(txn.amount, Money::from_cents(-250));
    }
}
