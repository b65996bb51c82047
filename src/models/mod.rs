//! Core data models
//!
//! - `Money`: signed amounts in cents
//! - `Account`: a totals row with the cached balance
//! - `Transaction`: a single entry owned by one account

pub mod account;
pub mod money;
pub mod transaction;

pub use account::{Account, AccountValidationError};
pub use money::{Money, MoneyParseError};
pub use transaction::{Transaction, TransactionId};
