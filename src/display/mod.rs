//! Display formatting for terminal output
//!
//! Formats service results for the shell, including the transaction table
//! and colored balances.

pub mod account;
pub mod transaction;

pub use account::{format_account_list, format_inspection, format_prompt, format_selection};
pub use transaction::{format_amount, format_balance_change, format_timestamp, format_transaction_table};
