//! Service layer
//!
//! Business logic on top of the storage layer: validation, the active
//! account, and the transactional balance updates.

pub mod account;

pub use account::{AccountService, BalanceChange, Inspection, Selection, ShowLimit};
