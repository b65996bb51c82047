//! Account model
//!
//! An account is a named ledger. Its row in the totals index carries the
//! cached running balance of all its transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Money;

/// A totals row: account name, cached balance and timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account name
    pub name: String,

    /// Sum of all transaction amounts for this account
    pub balance: Money,

    /// When the account was first selected
    pub created_at: DateTime<Utc>,

    /// Last time the cached balance was written
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            balance: Money::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate an account name
    pub fn validate_name(name: &str) -> Result<(), AccountValidationError> {
        if name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(AccountValidationError::ContainsWhitespace(name.to_string()));
        }
        Ok(())
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    ContainsWhitespace(String),
}

impl std::fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::ContainsWhitespace(name) => {
                write!(f, "Account name '{}' cannot contain whitespace", name)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}
