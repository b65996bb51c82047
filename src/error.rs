//! Error types for the ledger
//!
//! Every command returns a tagged `LedgerError` instead of aborting, so the
//! shell can render it and keep reading input.

use thiserror::Error;

/// The main error type for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Wrong passphrase or a database that fails authentication
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Storage path unreachable or unwritable
    #[error("I/O error: {0}")]
    Io(String),

    /// An operation needs an active account and none is selected
    #[error("No account selected")]
    NoActiveAccount,

    /// Malformed amount, id, limit or name
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Encryption errors other than a failed authentication
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an authentication error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::InvalidArgument("amount 'abc'".into());
        assert_eq!(err.to_string(), "Invalid argument: amount 'abc'");
        assert_eq!(LedgerError::NoActiveAccount.to_string(), "No account selected");
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::transaction_not_found("42");
        assert_eq!(err.to_string(), "Transaction not found: 42");
        assert!(err.is_not_found());
        assert!(!err.is_auth());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LedgerError = io_err.into();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
